//! # Inventory Classifier
//!
//! Resolves each finding against its broker and sorts it into exactly one
//! bucket:
//!
//! | Condition, first match wins                          | Bucket       |
//! |------------------------------------------------------|--------------|
//! | offer or seller cannot be resolved                   | `invalid`    |
//! | a stored receipt for the offer fails verification    | `invalid`    |
//! | a stored receipt for the offer verifies              | `licensed`   |
//! | the user holds an account for the offer's seller     | `own`        |
//! | public license is noncommercial, policy ignores it   | `ignored`    |
//! | public license is reciprocal, policy ignores it      | `ignored`    |
//! | otherwise                                            | `unlicensed` |
//!
//! Every finding that is not invalid is also listed in `licensable`.
//! Findings are resolved concurrently; one finding's outcome never affects
//! another's.

use std::sync::Arc;

use lzero_broker::{BrokerClient, BrokerPool, ResolutionCache};
use lzero_core::{BrokerInfo, Offer, PublicLicenseFamily, Seller};
use lzero_trust::verify_receipt;
use serde::Serialize;
use tokio::task::JoinSet;

use crate::finding::Finding;
use crate::store::IdentityStore;

/// Which public-license families the caller may skip.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Policy {
    /// The project is noncommercial.
    pub ignore_noncommercial: bool,
    /// The project is open source (`--open`).
    pub ignore_reciprocal: bool,
}

impl Policy {
    fn ignores(&self, family: PublicLicenseFamily) -> bool {
        match family {
            PublicLicenseFamily::Noncommercial => self.ignore_noncommercial,
            PublicLicenseFamily::Reciprocal => self.ignore_reciprocal,
            PublicLicenseFamily::Unknown => false,
        }
    }
}

/// A finding with its broker records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Item {
    #[serde(flatten)]
    pub finding: Finding,
    pub offer: Offer,
    pub seller: Seller,
    /// Reseller record, when the broker has one.
    #[serde(rename = "reseller", skip_serializing_if = "Option::is_none")]
    pub broker: Option<BrokerInfo>,
}

/// Where a resolved item ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Bucket {
    Licensed,
    Own,
    Ignored,
    Unlicensed,
}

/// A finding that could not be resolved or whose receipt is not trusted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvalidItem {
    #[serde(flatten)]
    pub finding: Finding,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Inventory {
    pub licensable: Vec<Item>,
    pub licensed: Vec<Item>,
    pub own: Vec<Item>,
    pub ignored: Vec<Item>,
    pub unlicensed: Vec<Item>,
    pub invalid: Vec<InvalidItem>,
}

impl Inventory {
    fn push(&mut self, item: Item, bucket: Bucket) {
        self.licensable.push(item.clone());
        match bucket {
            Bucket::Licensed => self.licensed.push(item),
            Bucket::Own => self.own.push(item),
            Bucket::Ignored => self.ignored.push(item),
            Bucket::Unlicensed => self.unlicensed.push(item),
        }
    }

    /// True when nothing is invalid and nothing still needs a license.
    pub fn is_clean(&self) -> bool {
        self.invalid.is_empty() && self.unlicensed.is_empty()
    }
}

type Outcome = Result<(Item, Bucket), InvalidItem>;

/// Classifies findings against brokers and the local identity store.
///
/// Cheap to clone; clones share the pool and the in-run cache.
#[derive(Clone)]
pub struct Classifier {
    pool: Arc<BrokerPool>,
    cache: Arc<ResolutionCache>,
    store: Arc<IdentityStore>,
    policy: Policy,
}

impl Classifier {
    pub fn new(
        pool: Arc<BrokerPool>,
        cache: Arc<ResolutionCache>,
        store: Arc<IdentityStore>,
        policy: Policy,
    ) -> Self {
        Self {
            pool,
            cache,
            store,
            policy,
        }
    }

    /// Resolve and bucket every finding. Output order within each bucket
    /// follows input order.
    pub async fn classify(&self, findings: Vec<Finding>) -> Inventory {
        let mut tasks = JoinSet::new();
        for (index, finding) in findings.iter().cloned().enumerate() {
            let this = self.clone();
            tasks.spawn(async move { (index, this.classify_one(finding).await) });
        }

        let mut outcomes: Vec<Option<Outcome>> = vec![None; findings.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, outcome)) => outcomes[index] = Some(outcome),
                Err(e) => tracing::error!(error = %e, "classification task failed"),
            }
        }

        let mut inventory = Inventory::default();
        for (finding, outcome) in findings.into_iter().zip(outcomes) {
            match outcome {
                Some(Ok((item, bucket))) => inventory.push(item, bucket),
                Some(Err(invalid)) => inventory.invalid.push(invalid),
                None => inventory.invalid.push(InvalidItem {
                    finding,
                    reason: "classification task failed".into(),
                }),
            }
        }

        tracing::info!(
            licensable = inventory.licensable.len(),
            licensed = inventory.licensed.len(),
            own = inventory.own.len(),
            ignored = inventory.ignored.len(),
            unlicensed = inventory.unlicensed.len(),
            invalid = inventory.invalid.len(),
            "classification complete"
        );
        inventory
    }

    async fn classify_one(&self, finding: Finding) -> Outcome {
        let client = self.pool.client(&finding.broker);
        let invalid = |finding: &Finding, reason: String| {
            tracing::warn!(broker = %finding.broker, offer_id = %finding.offer_id, reason = %reason, "invalid finding");
            InvalidItem {
                finding: finding.clone(),
                reason,
            }
        };

        let offer = match self.cache.offer(&client, finding.offer_id).await {
            Ok(offer) => offer,
            Err(e) => return Err(invalid(&finding, e.to_string())),
        };
        let seller = match self.cache.seller(&client, offer.seller_id).await {
            Ok(seller) => seller,
            Err(e) => return Err(invalid(&finding, e.to_string())),
        };
        let broker = match self.cache.broker(&client).await {
            Ok(broker) => broker,
            Err(e) => {
                tracing::warn!(broker = %finding.broker, error = %e, "reseller record unavailable");
                None
            }
        };

        let bucket = match self.bucket(&client, &finding, &offer).await {
            Ok(bucket) => bucket,
            Err(reason) => return Err(invalid(&finding, reason)),
        };
        tracing::debug!(broker = %finding.broker, offer_id = %finding.offer_id, ?bucket, "classified");
        Ok((
            Item {
                finding,
                offer,
                seller,
                broker,
            },
            bucket,
        ))
    }

    async fn bucket(
        &self,
        client: &BrokerClient,
        finding: &Finding,
        offer: &Offer,
    ) -> Result<Bucket, String> {
        let receipts: Vec<_> = self
            .store
            .receipts_for(&finding.broker, &finding.offer_id)
            .collect();
        if !receipts.is_empty() {
            let register = self
                .cache
                .register(client)
                .await
                .map_err(|e| e.to_string())?;
            let mut first_failure = None;
            for stored in &receipts {
                match verify_receipt(&stored.receipt, &register, self.pool.registry()) {
                    Ok(()) => return Ok(Bucket::Licensed),
                    Err(e) => {
                        first_failure
                            .get_or_insert_with(|| format!("receipt {}: {e}", stored.path.display()));
                    }
                }
            }
            return Err(first_failure.unwrap_or_default());
        }

        if self.store.owns(&finding.broker, &offer.seller_id) {
            return Ok(Bucket::Own);
        }
        if self.policy.ignores(finding.public_family()) {
            return Ok(Bucket::Ignored);
        }
        Ok(Bucket::Unlicensed)
    }
}
