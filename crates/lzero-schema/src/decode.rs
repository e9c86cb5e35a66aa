//! # Validated Decoding
//!
//! Raw bytes become typed records in three steps:
//!
//! 1. Parse into a *draft*: the record's shape with every field optional.
//!    Wrong JSON types fail here, and so does an explicit `null`. Missing
//!    fields do not.
//! 2. Validate the draft against the record's schema in the
//!    [`SchemaRegistry`].
//! 3. Convert the draft into the `lzero-core` record, parsing identifiers,
//!    URLs and timestamps. Only this step produces a value callers can hold.
//!
//! A body that is not JSON at all is a [`DecodeError::Syntax`]. Everything
//! else that is wrong with it is a [`SchemaError`], so callers can tell
//! "sent garbage bytes" from "sent a well-formed but invalid record".

use std::collections::BTreeMap;

use lzero_core::{
    Account, BrokerInfo, BrokerUrl, KeyRegister, License, LicenseValues, Offer, OfferId, OrderId,
    Party, Price, Pricing, Receipt, Seller, SellerId, Timeframe, Timestamp,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use crate::registry::{SchemaError, SchemaKind, SchemaRegistry, ValidationViolations};

/// Error decoding a record.
#[derive(Error, Debug)]
pub enum DecodeError {
    /// The bytes are not JSON.
    #[error("{kind} is not valid JSON: {source}")]
    Syntax {
        kind: SchemaKind,
        #[source]
        source: serde_json::Error,
    },

    /// The JSON does not describe a valid record.
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl DecodeError {
    pub fn kind(&self) -> SchemaKind {
        match self {
            Self::Syntax { kind, .. } => *kind,
            Self::Schema(e) => e.kind(),
        }
    }
}

/// A draft record: all fields optional, validated before conversion.
trait Draft: DeserializeOwned + Serialize {
    type Record;

    fn finish(self) -> Result<Self::Record, ValidationViolations>;
}

fn decode<D: Draft>(
    registry: &SchemaRegistry,
    kind: SchemaKind,
    bytes: &[u8],
) -> Result<D::Record, DecodeError> {
    let draft: D = serde_json::from_slice(bytes).map_err(|e| match e.classify() {
        serde_json::error::Category::Data => DecodeError::Schema(SchemaError::ValidationFailed {
            kind,
            violations: ValidationViolations::single("", e.to_string()),
        }),
        _ => DecodeError::Syntax { kind, source: e },
    })?;

    let instance = serde_json::to_value(&draft).map_err(|e| SchemaError::ValidationFailed {
        kind,
        violations: ValidationViolations::single("", e.to_string()),
    })?;
    registry.validate(kind, &instance)?;

    draft
        .finish()
        .map_err(|violations| SchemaError::ValidationFailed { kind, violations }.into())
}

/// Reads a draft field that, when present, must not be `null`.
///
/// With `#[serde(default)]` a missing field is still `None`, but an
/// explicit `null` fails to parse instead of vanishing from the draft the
/// schema sees.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

fn required<T>(value: Option<T>, path: &str) -> Result<T, ValidationViolations> {
    value.ok_or_else(|| ValidationViolations::single(path, "required field is missing"))
}

fn field<T, E: std::fmt::Display>(
    result: Result<T, E>,
    path: &str,
) -> Result<T, ValidationViolations> {
    result.map_err(|e| ValidationViolations::single(path, e.to_string()))
}

// ---------------------------------------------------------------------------
// Drafts shared across records
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Serialize, Deserialize)]
struct PriceDraft {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    amount: Option<u64>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    currency: Option<String>,
}

impl PriceDraft {
    fn finish(self, path: &str) -> Result<Price, ValidationViolations> {
        Ok(Price {
            amount: required(self.amount, &format!("{path}/amount"))?,
            currency: required(self.currency, &format!("{path}/currency"))?,
        })
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct PartyDraft {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    jurisdiction: Option<String>,
}

impl PartyDraft {
    fn finish_at(self, path: &str) -> Result<Party, ValidationViolations> {
        Ok(Party {
            name: required(self.name, &format!("{path}/name"))?,
            email: required(self.email, &format!("{path}/email"))?,
            jurisdiction: required(self.jurisdiction, &format!("{path}/jurisdiction"))?,
        })
    }
}

impl Draft for PartyDraft {
    type Record = Seller;

    fn finish(self) -> Result<Seller, ValidationViolations> {
        self.finish_at("")
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct BrokerDraft {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    jurisdiction: Option<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    website: Option<String>,
}

impl BrokerDraft {
    fn finish_at(self, path: &str) -> Result<BrokerInfo, ValidationViolations> {
        Ok(BrokerInfo {
            name: required(self.name, &format!("{path}/name"))?,
            email: required(self.email, &format!("{path}/email"))?,
            jurisdiction: required(self.jurisdiction, &format!("{path}/jurisdiction"))?,
            website: required(self.website, &format!("{path}/website"))?,
        })
    }
}

impl Draft for BrokerDraft {
    type Record = BrokerInfo;

    fn finish(self) -> Result<BrokerInfo, ValidationViolations> {
        self.finish_at("")
    }
}

// ---------------------------------------------------------------------------
// Offer
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Serialize, Deserialize)]
struct PricingDraft {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    single: Option<PriceDraft>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    relicense: Option<PriceDraft>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    site: Option<PriceDraft>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct OfferDraft {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    #[serde(
        rename = "sellerID",
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    seller_id: Option<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pricing: Option<PricingDraft>,
}

impl Draft for OfferDraft {
    type Record = Offer;

    fn finish(self) -> Result<Offer, ValidationViolations> {
        let pricing = required(self.pricing, "/pricing")?;
        let seller_id = required(self.seller_id, "/sellerID")?;
        Ok(Offer {
            url: required(self.url, "/url")?,
            seller_id: field(SellerId::parse(&seller_id), "/sellerID")?,
            pricing: Pricing {
                single: required(pricing.single, "/pricing/single")?.finish("/pricing/single")?,
                relicense: pricing
                    .relicense
                    .map(|p| p.finish("/pricing/relicense"))
                    .transpose()?,
                site: pricing.site.map(|p| p.finish("/pricing/site")).transpose()?,
            },
        })
    }
}

// ---------------------------------------------------------------------------
// Key register
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Serialize, Deserialize)]
struct TimeframeDraft {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    from: Option<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    through: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct RegisterDraft {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    updated: Option<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    keys: Option<BTreeMap<String, TimeframeDraft>>,
}

impl Draft for RegisterDraft {
    type Record = KeyRegister;

    fn finish(self) -> Result<KeyRegister, ValidationViolations> {
        let updated = required(self.updated, "/updated")?;
        let mut keys = BTreeMap::new();
        for (key, tf) in required(self.keys, "/keys")? {
            let path = format!("/keys/{key}");
            let from = required(tf.from, &format!("{path}/from"))?;
            let timeframe = Timeframe {
                from: field(Timestamp::parse(&from), &format!("{path}/from"))?,
                through: tf
                    .through
                    .map(|t| field(Timestamp::parse(&t), &format!("{path}/through")))
                    .transpose()?,
            };
            keys.insert(key.to_ascii_lowercase(), timeframe);
        }
        Ok(KeyRegister {
            updated: field(Timestamp::parse(&updated), "/updated")?,
            keys,
        })
    }
}

// ---------------------------------------------------------------------------
// Receipt
// ---------------------------------------------------------------------------

// Receipt drafts reject unknown fields: anything dropped here would change
// the canonical bytes and break the signature.

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct ValuesDraft {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    api: Option<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    effective: Option<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    expires: Option<String>,
    #[serde(
        rename = "offerID",
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    offer_id: Option<String>,
    #[serde(
        rename = "orderID",
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    order_id: Option<String>,
    #[serde(
        rename = "sellerID",
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    seller_id: Option<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    buyer: Option<StrictPartyDraft>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    seller: Option<StrictPartyDraft>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    broker: Option<StrictBrokerDraft>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    price: Option<StrictPriceDraft>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct StrictPriceDraft {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    amount: Option<u64>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    currency: Option<String>,
}

impl From<StrictPriceDraft> for PriceDraft {
    fn from(d: StrictPriceDraft) -> Self {
        Self {
            amount: d.amount,
            currency: d.currency,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct StrictPartyDraft {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    jurisdiction: Option<String>,
}

impl From<StrictPartyDraft> for PartyDraft {
    fn from(d: StrictPartyDraft) -> Self {
        Self {
            name: d.name,
            email: d.email,
            jurisdiction: d.jurisdiction,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct StrictBrokerDraft {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    jurisdiction: Option<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    website: Option<String>,
}

impl From<StrictBrokerDraft> for BrokerDraft {
    fn from(d: StrictBrokerDraft) -> Self {
        Self {
            name: d.name,
            email: d.email,
            jurisdiction: d.jurisdiction,
            website: d.website,
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct LicenseDraft {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    form: Option<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    values: Option<ValuesDraft>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct ReceiptDraft {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    key: Option<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    signature: Option<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    license: Option<LicenseDraft>,
}

impl Draft for ReceiptDraft {
    type Record = Receipt;

    fn finish(self) -> Result<Receipt, ValidationViolations> {
        let license = required(self.license, "/license")?;
        let v = required(license.values, "/license/values")?;
        let p = "/license/values";

        let effective = required(v.effective, &format!("{p}/effective"))?;
        field(Timestamp::parse(&effective), &format!("{p}/effective"))?;
        if let Some(expires) = &v.expires {
            field(Timestamp::parse(expires), &format!("{p}/expires"))?;
        }
        let offer_id = required(v.offer_id, &format!("{p}/offerID"))?;
        let order_id = required(v.order_id, &format!("{p}/orderID"))?;
        let seller_id = required(v.seller_id, &format!("{p}/sellerID"))?;

        let values = LicenseValues {
            api: required(v.api, &format!("{p}/api"))?,
            effective,
            expires: v.expires,
            offer_id: field(OfferId::parse(&offer_id), &format!("{p}/offerID"))?,
            order_id: field(OrderId::parse(&order_id), &format!("{p}/orderID"))?,
            seller_id: field(SellerId::parse(&seller_id), &format!("{p}/sellerID"))?,
            buyer: PartyDraft::from(required(v.buyer, &format!("{p}/buyer"))?)
                .finish_at(&format!("{p}/buyer"))?,
            seller: PartyDraft::from(required(v.seller, &format!("{p}/seller"))?)
                .finish_at(&format!("{p}/seller"))?,
            broker: v
                .broker
                .map(|b| BrokerDraft::from(b).finish_at(&format!("{p}/broker")))
                .transpose()?,
            price: v
                .price
                .map(|pr| PriceDraft::from(pr).finish(&format!("{p}/price")))
                .transpose()?,
        };

        Ok(Receipt {
            key: required(self.key, "/key")?,
            signature: required(self.signature, "/signature")?,
            license: License {
                form: required(license.form, "/license/form")?,
                values,
            },
        })
    }
}

// ---------------------------------------------------------------------------
// Account
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Serialize, Deserialize)]
struct AccountDraft {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    server: Option<String>,
    #[serde(
        rename = "sellerID",
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    seller_id: Option<String>,
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    token: Option<String>,
}

impl Draft for AccountDraft {
    type Record = Account;

    fn finish(self) -> Result<Account, ValidationViolations> {
        let server = required(self.server, "/server")?;
        let seller_id = required(self.seller_id, "/sellerID")?;
        Ok(Account {
            server: field(BrokerUrl::parse(&server), "/server")?,
            seller_id: field(SellerId::parse(&seller_id), "/sellerID")?,
            token: required(self.token, "/token")?,
        })
    }
}

// ---------------------------------------------------------------------------
// licensezero.json
// ---------------------------------------------------------------------------

/// One usable entry of a `licensezero.json` file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestOffer {
    pub server: BrokerUrl,
    pub offer_id: OfferId,
    /// Public license identifier, e.g. `Parity-7.0.0`.
    pub public: String,
}

/// An entry that was present but unusable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEntry {
    /// Position in the `offers` array.
    pub index: usize,
    pub reason: String,
}

/// A decoded `licensezero.json`.
///
/// One bad entry does not discard the others: usable entries land in
/// `offers`, the rest in `skipped`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    pub offers: Vec<ManifestOffer>,
    pub skipped: Vec<SkippedEntry>,
}

/// Entry fields read `null` as missing, so such an entry is skipped
/// rather than failing the whole file.
#[derive(Debug, Default, Serialize, Deserialize)]
struct ManifestEntryDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    server: Option<String>,
    #[serde(rename = "offerID", default, skip_serializing_if = "Option::is_none")]
    offer_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    public: Option<String>,
}

impl ManifestEntryDraft {
    fn finish(self) -> Result<ManifestOffer, String> {
        let server = self.server.ok_or("missing \"server\"")?;
        let offer_id = self.offer_id.ok_or("missing \"offerID\"")?;
        let public = self.public.ok_or("missing \"public\"")?;
        Ok(ManifestOffer {
            server: BrokerUrl::parse(&server).map_err(|e| e.to_string())?,
            offer_id: OfferId::parse(&offer_id).map_err(|e| e.to_string())?,
            public,
        })
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ManifestDraft {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    offers: Option<Vec<ManifestEntryDraft>>,
}

impl Draft for ManifestDraft {
    type Record = Manifest;

    fn finish(self) -> Result<Manifest, ValidationViolations> {
        let mut manifest = Manifest::default();
        for (index, entry) in required(self.offers, "/offers")?.into_iter().enumerate() {
            match entry.finish() {
                Ok(offer) => manifest.offers.push(offer),
                Err(reason) => manifest.skipped.push(SkippedEntry { index, reason }),
            }
        }
        Ok(manifest)
    }
}

// ---------------------------------------------------------------------------
// Order
// ---------------------------------------------------------------------------

/// Response to `POST {broker}/buy`: where the buyer completes the order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OrderCreated {
    pub location: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct OrderDraft {
    #[serde(default, deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    location: Option<String>,
}

impl Draft for OrderDraft {
    type Record = OrderCreated;

    fn finish(self) -> Result<OrderCreated, ValidationViolations> {
        Ok(OrderCreated {
            location: required(self.location, "/location")?,
        })
    }
}

// ---------------------------------------------------------------------------
// Public entry points
// ---------------------------------------------------------------------------

pub fn decode_offer(registry: &SchemaRegistry, bytes: &[u8]) -> Result<Offer, DecodeError> {
    decode::<OfferDraft>(registry, SchemaKind::Offer, bytes)
}

pub fn decode_seller(registry: &SchemaRegistry, bytes: &[u8]) -> Result<Seller, DecodeError> {
    decode::<PartyDraft>(registry, SchemaKind::Seller, bytes)
}

pub fn decode_broker(registry: &SchemaRegistry, bytes: &[u8]) -> Result<BrokerInfo, DecodeError> {
    decode::<BrokerDraft>(registry, SchemaKind::Broker, bytes)
}

pub fn decode_register(
    registry: &SchemaRegistry,
    bytes: &[u8],
) -> Result<KeyRegister, DecodeError> {
    decode::<RegisterDraft>(registry, SchemaKind::Register, bytes)
}

/// Decode a receipt file or `orders/{id}/latest` response.
///
/// Only the structure is checked. The signature and key window are
/// `lzero-trust`'s job.
pub fn decode_receipt(registry: &SchemaRegistry, bytes: &[u8]) -> Result<Receipt, DecodeError> {
    decode::<ReceiptDraft>(registry, SchemaKind::Receipt, bytes)
}

pub fn decode_account(registry: &SchemaRegistry, bytes: &[u8]) -> Result<Account, DecodeError> {
    decode::<AccountDraft>(registry, SchemaKind::Account, bytes)
}

pub fn decode_manifest(registry: &SchemaRegistry, bytes: &[u8]) -> Result<Manifest, DecodeError> {
    decode::<ManifestDraft>(registry, SchemaKind::Manifest, bytes)
}

pub fn decode_order(
    registry: &SchemaRegistry,
    bytes: &[u8],
) -> Result<OrderCreated, DecodeError> {
    decode::<OrderDraft>(registry, SchemaKind::Order, bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn registry() -> SchemaRegistry {
        SchemaRegistry::new().unwrap()
    }

    fn bytes(value: serde_json::Value) -> Vec<u8> {
        serde_json::to_vec(&value).unwrap()
    }

    fn receipt_json() -> serde_json::Value {
        json!({
            "key": "aa".repeat(32),
            "signature": "bb".repeat(64),
            "license": {
                "form": "Permission is hereby granted...",
                "values": {
                    "api": "https://broker.example",
                    "effective": "2018-01-01T00:00:00Z",
                    "offerID": "186d34a9-c8f7-414c-91bc-a34b4553b91d",
                    "orderID": "0b5e3c8a-7d44-4c61-a0ad-42b5c44d4a10",
                    "sellerID": "902d1be5-9e5c-4d6a-8f0b-6a3bb8e7d5a1",
                    "buyer": {"name": "Buyer", "email": "buyer@example.com", "jurisdiction": "US-CA"},
                    "seller": {"name": "Seller", "email": "seller@example.com", "jurisdiction": "GB"},
                    "price": {"amount": 1000, "currency": "USD"}
                }
            }
        })
    }

    #[test]
    fn decodes_valid_offer() {
        let offer = decode_offer(
            &registry(),
            &bytes(json!({
                "url": "https://example.com/project",
                "sellerID": "902d1be5-9e5c-4d6a-8f0b-6a3bb8e7d5a1",
                "pricing": {
                    "single": {"amount": 1000, "currency": "USD"},
                    "relicense": {"amount": 100000, "currency": "USD"}
                },
                "extra": "ignored"
            })),
        )
        .unwrap();
        assert_eq!(offer.pricing.single.amount, 1000);
        assert_eq!(offer.pricing.relicense.unwrap().amount, 100000);
        assert!(offer.pricing.site.is_none());
    }

    #[test]
    fn zero_price_offer_is_schema_error() {
        let err = decode_offer(
            &registry(),
            &bytes(json!({
                "url": "https://example.com/project",
                "sellerID": "902d1be5-9e5c-4d6a-8f0b-6a3bb8e7d5a1",
                "pricing": {"single": {"amount": 0, "currency": "USD"}}
            })),
        )
        .unwrap_err();
        assert!(matches!(err, DecodeError::Schema(_)));
        assert_eq!(err.kind(), SchemaKind::Offer);
    }

    #[test]
    fn wrong_json_type_is_schema_error_not_syntax() {
        let err = decode_offer(
            &registry(),
            &bytes(json!({"url": 7, "sellerID": "x", "pricing": {}})),
        )
        .unwrap_err();
        assert!(matches!(err, DecodeError::Schema(_)));
    }

    #[test]
    fn non_json_is_syntax_error() {
        let err = decode_seller(&registry(), b"<html>502</html>").unwrap_err();
        assert!(matches!(err, DecodeError::Syntax { kind: SchemaKind::Seller, .. }));
    }

    #[test]
    fn seller_missing_jurisdiction_is_rejected() {
        let err = decode_seller(
            &registry(),
            &bytes(json!({"name": "Ann", "email": "ann@example.com"})),
        )
        .unwrap_err();
        assert!(matches!(err, DecodeError::Schema(_)));
    }

    #[test]
    fn register_keys_are_lowercased() {
        let register = decode_register(
            &registry(),
            &bytes(json!({
                "updated": "2019-01-01T00:00:00Z",
                "keys": {("AB".repeat(32)): {"from": "2018-01-01T00:00:00Z"}}
            })),
        )
        .unwrap();
        assert!(register.keys.contains_key(&"ab".repeat(32)));
    }

    #[test]
    fn register_with_bad_timestamp_is_rejected() {
        let err = decode_register(
            &registry(),
            &bytes(json!({
                "updated": "2019-01-01T00:00:00Z",
                "keys": {("ab".repeat(32)): {"from": "last tuesday"}}
            })),
        )
        .unwrap_err();
        let text = err.to_string();
        assert!(text.contains("from"), "{text}");
    }

    #[test]
    fn receipt_decodes_and_preserves_signed_text() {
        let original = receipt_json();
        let receipt = decode_receipt(&registry(), &bytes(original.clone())).unwrap();
        let reparsed: serde_json::Value =
            serde_json::from_str(receipt.signed_bytes().unwrap().as_str()).unwrap();
        assert_eq!(reparsed, original["license"]);
    }

    #[test]
    fn receipt_unknown_value_field_is_rejected() {
        let mut value = receipt_json();
        value["license"]["values"]["discount"] = json!("50%");
        let err = decode_receipt(&registry(), &bytes(value)).unwrap_err();
        assert!(matches!(err, DecodeError::Schema(_)));
    }

    #[test]
    fn receipt_with_null_optionals_is_rejected() {
        let mut value = receipt_json();
        value["license"]["values"]["expires"] = json!(null);
        value["license"]["values"]["broker"] = json!(null);
        value["license"]["values"]["price"] = json!(null);
        let err = decode_receipt(&registry(), &bytes(value)).unwrap_err();
        assert!(matches!(err, DecodeError::Schema(_)));
        assert_eq!(err.kind(), SchemaKind::Receipt);
    }

    #[test]
    fn register_with_null_through_is_not_an_open_window() {
        let err = decode_register(
            &registry(),
            &bytes(json!({
                "updated": "2019-01-01T00:00:00Z",
                "keys": {("ab".repeat(32)): {"from": "2018-01-01T00:00:00Z", "through": null}}
            })),
        )
        .unwrap_err();
        assert!(matches!(err, DecodeError::Schema(_)));
    }

    #[test]
    fn offer_with_null_site_price_is_rejected() {
        let err = decode_offer(
            &registry(),
            &bytes(json!({
                "url": "https://example.com/project",
                "sellerID": "902d1be5-9e5c-4d6a-8f0b-6a3bb8e7d5a1",
                "pricing": {"single": {"amount": 1000, "currency": "USD"}, "site": null}
            })),
        )
        .unwrap_err();
        assert!(matches!(err, DecodeError::Schema(_)));
    }

    #[test]
    fn receipt_with_uppercase_uuid_is_rejected() {
        let mut value = receipt_json();
        value["license"]["values"]["offerID"] = json!("186D34A9-C8F7-414C-91BC-A34B4553B91D");
        assert!(decode_receipt(&registry(), &bytes(value)).is_err());
    }

    #[test]
    fn account_decodes_with_normalized_server() {
        let account = decode_account(
            &registry(),
            &bytes(json!({
                "server": "https://broker.example/",
                "sellerID": "902d1be5-9e5c-4d6a-8f0b-6a3bb8e7d5a1",
                "token": "t0k3n"
            })),
        )
        .unwrap();
        assert_eq!(account.server.as_str(), "https://broker.example");
    }

    #[test]
    fn manifest_keeps_good_entries_and_skips_bad_ones() {
        let manifest = decode_manifest(
            &registry(),
            &bytes(json!({
                "offers": [
                    {"server": "https://broker.example", "offerID": "186d34a9-c8f7-414c-91bc-a34b4553b91d", "public": "Parity-7.0.0"},
                    {"server": "ftp://broker.example", "offerID": "186d34a9-c8f7-414c-91bc-a34b4553b91d", "public": "Parity-7.0.0"},
                    {"server": "https://broker.example", "public": "Parity-7.0.0"}
                ]
            })),
        )
        .unwrap();
        assert_eq!(manifest.offers.len(), 1);
        assert_eq!(manifest.offers[0].public, "Parity-7.0.0");
        let skipped: Vec<usize> = manifest.skipped.iter().map(|s| s.index).collect();
        assert_eq!(skipped, vec![1, 2]);
    }

    #[test]
    fn manifest_entry_with_null_field_is_skipped() {
        let manifest = decode_manifest(
            &registry(),
            &bytes(json!({
                "offers": [
                    {"server": "https://broker.example", "offerID": null, "public": "Parity-7.0.0"},
                    {"server": "https://broker.example", "offerID": "186d34a9-c8f7-414c-91bc-a34b4553b91d", "public": "Parity-7.0.0"}
                ]
            })),
        )
        .unwrap();
        assert_eq!(manifest.offers.len(), 1);
        assert_eq!(manifest.skipped[0].index, 0);
    }

    #[test]
    fn manifest_without_offers_is_rejected() {
        assert!(decode_manifest(&registry(), br#"{"name": "pkg"}"#).is_err());
    }

    #[test]
    fn order_location_is_required() {
        let order = decode_order(
            &registry(),
            br#"{"location": "https://broker.example/pay/123"}"#,
        )
        .unwrap();
        assert_eq!(order.location, "https://broker.example/pay/123");
        assert!(decode_order(&registry(), b"{}").is_err());
    }
}
