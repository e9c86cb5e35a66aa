//! End-to-end classification against a mock broker.

use std::sync::Arc;

use lzero_broker::{BrokerConfig, BrokerPool, ResolutionCache};
use lzero_core::{
    Account, BrokerUrl, CanonicalBytes, License, LicenseValues, OfferId, OrderId, Party, Receipt,
    SellerId,
};
use lzero_crypto::Ed25519KeyPair;
use lzero_inventory::{
    Classifier, Finding, IdentityStore, Inventory, PackageMeta, Policy, StoredReceipt,
};
use lzero_schema::SchemaRegistry;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SELLER_ID: &str = "902d1be5-9e5c-4d6a-8f0b-6a3bb8e7d5a1";
const OTHER_SELLER_ID: &str = "5f0e8a4c-3b2d-4e1f-9a8b-7c6d5e4f3a2b";
const OWN: &str = "186d34a9-c8f7-414c-91bc-a34b4553b91d";
const LICENSED: &str = "2e9c3c8b-0f8e-4a57-9a3c-6cf1e7c1b0d2";
const NONCOMMERCIAL: &str = "3a1b2c3d-4e5f-4a6b-8c7d-9e0f1a2b3c4d";
const RECIPROCAL: &str = "4b2c3d4e-5f6a-4b7c-8d9e-0f1a2b3c4d5e";
const BROKEN: &str = "5c3d4e5f-6a7b-4c8d-9e0f-1a2b3c4d5e6f";
const BACKDATED: &str = "6d4e5f6a-7b8c-4d9e-8f0a-2b3c4d5e6f7a";
const ORDER_ID: &str = "0b5e3c8a-7d44-4c61-a0ad-42b5c44d4a10";

fn finding(broker: &BrokerUrl, offer: &str, public: &str) -> Finding {
    Finding {
        ecosystem: "embedded",
        path: format!("/deps/{offer}").into(),
        package: PackageMeta::default(),
        broker: broker.clone(),
        offer_id: OfferId::parse(offer).unwrap(),
        public: public.into(),
    }
}

async fn mount_offer(server: &MockServer, offer: &str, seller: &str, amount: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/offers/{offer}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "url": "https://example.com/project",
            "sellerID": seller,
            "pricing": {"single": {"amount": amount, "currency": "USD"}}
        })))
        .mount(server)
        .await;
}

fn party(name: &str) -> Party {
    Party {
        name: name.into(),
        email: format!("{}@example.com", name.to_lowercase()),
        jurisdiction: "US-CA".into(),
    }
}

fn receipt(keypair: &Ed25519KeyPair, api: &str, offer: &str, effective: &str) -> Receipt {
    let license = License {
        form: "Permission is hereby granted...".into(),
        values: LicenseValues {
            api: api.into(),
            effective: effective.into(),
            expires: None,
            offer_id: OfferId::parse(offer).unwrap(),
            order_id: OrderId::parse(ORDER_ID).unwrap(),
            seller_id: SellerId::parse(SELLER_ID).unwrap(),
            buyer: party("Buyer"),
            seller: party("Seller"),
            broker: None,
            price: None,
        },
    };
    let signature = keypair.sign(&CanonicalBytes::new(&license).unwrap());
    Receipt {
        key: keypair.public_key().to_hex(),
        signature: signature.to_hex(),
        license,
    }
}

struct Fixture {
    server: MockServer,
    broker: BrokerUrl,
    keypair: Ed25519KeyPair,
}

async fn fixture() -> Fixture {
    let server = MockServer::start().await;
    let broker = BrokerUrl::parse(&server.uri()).unwrap();
    let keypair = Ed25519KeyPair::from_seed(&[7; 32]);

    for offer in [OWN, LICENSED, NONCOMMERCIAL, RECIPROCAL, BACKDATED] {
        let seller = if offer == OWN { SELLER_ID } else { OTHER_SELLER_ID };
        mount_offer(&server, offer, seller, 1000).await;
    }
    mount_offer(&server, BROKEN, OTHER_SELLER_ID, 0).await;

    Mock::given(method("GET"))
        .and(path(format!("/sellers/{SELLER_ID}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "Ann Developer", "email": "ann@example.com", "jurisdiction": "US-CA"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/sellers/{OTHER_SELLER_ID}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "Bo Maintainer", "email": "bo@example.com", "jurisdiction": "GB"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/broker"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/register"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "updated": "2020-01-01T00:00:00Z",
            "keys": {(keypair.public_key().to_hex()): {"from": "2017-01-01T00:00:00Z"}}
        })))
        .expect(1)
        .mount(&server)
        .await;

    Fixture {
        server,
        broker,
        keypair,
    }
}

fn classifier(store: IdentityStore, policy: Policy) -> Classifier {
    let registry = Arc::new(SchemaRegistry::new().unwrap());
    let pool = Arc::new(BrokerPool::new(&BrokerConfig::local_mock(), registry).unwrap());
    Classifier::new(pool, Arc::new(ResolutionCache::new()), Arc::new(store), policy)
}

fn offers(items: &[lzero_inventory::Item]) -> Vec<String> {
    items.iter().map(|i| i.finding.offer_id.to_string()).collect()
}

async fn classify_all(fx: &Fixture, policy: Policy) -> Inventory {
    let api = fx.server.uri();
    let store = IdentityStore {
        receipts: vec![
            StoredReceipt {
                path: "receipts/licensed.json".into(),
                receipt: receipt(&fx.keypair, &api, LICENSED, "2018-01-01T00:00:00Z"),
            },
            StoredReceipt {
                path: "receipts/backdated.json".into(),
                receipt: receipt(&fx.keypair, &api, BACKDATED, "2016-06-01T00:00:00Z"),
            },
        ],
        accounts: vec![Account {
            server: fx.broker.clone(),
            seller_id: SellerId::parse(SELLER_ID).unwrap(),
            token: "token".into(),
        }],
    };
    let findings = vec![
        finding(&fx.broker, OWN, "Parity-7.0.0"),
        finding(&fx.broker, LICENSED, "Parity-7.0.0"),
        finding(&fx.broker, NONCOMMERCIAL, "Prosperity-3.0.0"),
        finding(&fx.broker, RECIPROCAL, "Parity-7.0.0"),
        finding(&fx.broker, BROKEN, "Parity-7.0.0"),
        finding(&fx.broker, BACKDATED, "Parity-7.0.0"),
    ];
    classifier(store, policy).classify(findings).await
}

#[tokio::test]
async fn every_finding_lands_in_exactly_one_bucket() {
    let fx = fixture().await;
    let inventory = classify_all(&fx, Policy::default()).await;

    assert_eq!(offers(&inventory.own), [OWN]);
    assert_eq!(offers(&inventory.licensed), [LICENSED]);
    assert_eq!(offers(&inventory.unlicensed), [NONCOMMERCIAL, RECIPROCAL]);
    assert!(inventory.ignored.is_empty());

    let invalid: Vec<String> = inventory
        .invalid
        .iter()
        .map(|i| i.finding.offer_id.to_string())
        .collect();
    assert_eq!(invalid, [BROKEN, BACKDATED]);
    assert!(inventory.invalid[1].reason.contains("backdated"));

    assert_eq!(offers(&inventory.licensable), [OWN, LICENSED, NONCOMMERCIAL, RECIPROCAL]);
    assert!(!inventory.is_clean());
}

#[tokio::test]
async fn policy_ignores_matching_families() {
    let fx = fixture().await;
    let noncommercial = classify_all(
        &fx,
        Policy {
            ignore_noncommercial: true,
            ignore_reciprocal: false,
        },
    )
    .await;
    assert_eq!(offers(&noncommercial.ignored), [NONCOMMERCIAL]);
    assert_eq!(offers(&noncommercial.unlicensed), [RECIPROCAL]);
}

#[tokio::test]
async fn open_source_mode_ignores_reciprocal() {
    let fx = fixture().await;
    let open = classify_all(
        &fx,
        Policy {
            ignore_noncommercial: false,
            ignore_reciprocal: true,
        },
    )
    .await;
    assert_eq!(offers(&open.ignored), [RECIPROCAL]);
    assert_eq!(offers(&open.unlicensed), [NONCOMMERCIAL]);
    // An account outranks policy.
    assert_eq!(offers(&open.own), [OWN]);
}

#[tokio::test]
async fn own_account_without_receipt_is_own() {
    let server = MockServer::start().await;
    let broker = BrokerUrl::parse(&server.uri()).unwrap();
    mount_offer(&server, OWN, SELLER_ID, 500).await;
    Mock::given(method("GET"))
        .and(path(format!("/sellers/{SELLER_ID}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "Ann Developer", "email": "ann@example.com", "jurisdiction": "US-CA"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/broker"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "Reseller", "email": "r@example.com", "jurisdiction": "US", "website": "https://reseller.example"
        })))
        .mount(&server)
        .await;

    let store = IdentityStore {
        receipts: Vec::new(),
        accounts: vec![Account {
            server: broker.clone(),
            seller_id: SellerId::parse(SELLER_ID).unwrap(),
            token: "token".into(),
        }],
    };
    let inventory = classifier(store, Policy::default())
        .classify(vec![finding(&broker, OWN, "Parity-7.0.0")])
        .await;

    assert_eq!(offers(&inventory.own), [OWN]);
    assert!(inventory.unlicensed.is_empty());
    assert_eq!(
        inventory.own[0].broker.as_ref().map(|b| b.name.as_str()),
        Some("Reseller")
    );
    assert!(inventory.is_clean());
}

#[tokio::test]
async fn unreachable_broker_only_invalidates_its_findings() {
    let server = MockServer::start().await;
    let broker = BrokerUrl::parse(&server.uri()).unwrap();
    mount_offer(&server, OWN, SELLER_ID, 500).await;
    Mock::given(method("GET"))
        .and(path(format!("/sellers/{SELLER_ID}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "Ann Developer", "email": "ann@example.com", "jurisdiction": "US-CA"
        })))
        .mount(&server)
        .await;
    // Reseller record fails; the finding still resolves.
    Mock::given(method("GET"))
        .and(path("/broker"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let dead = BrokerUrl::parse("http://127.0.0.1:1").unwrap();
    let inventory = classifier(IdentityStore::default(), Policy::default())
        .classify(vec![
            finding(&dead, LICENSED, "Parity-7.0.0"),
            finding(&broker, OWN, "Parity-7.0.0"),
        ])
        .await;

    assert_eq!(inventory.invalid.len(), 1);
    assert_eq!(inventory.invalid[0].finding.broker, dead);
    assert_eq!(offers(&inventory.unlicensed), [OWN]);
    assert!(inventory.unlicensed[0].broker.is_none());
}
