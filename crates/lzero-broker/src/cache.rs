//! # In-Run Resolution Cache
//!
//! Many findings usually point at the same few sellers and brokers. The
//! cache makes sure each distinct record is requested once per run, even
//! when many tasks ask for it at the same moment: the first caller
//! performs the request and every concurrent caller awaits the same
//! result.
//!
//! Failures are cached as well. A broker that is down is asked once, and
//! every finding that depends on it sees the same error.
//!
//! Nothing here outlives the process.

use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;

use dashmap::DashMap;
use lzero_core::{BrokerInfo, BrokerUrl, KeyRegister, Offer, OfferId, Seller, SellerId};
use tokio::sync::OnceCell;

use crate::client::BrokerClient;
use crate::error::BrokerError;

/// A cached outcome. Errors are shared because `reqwest::Error` is not
/// `Clone`.
pub type Shared<T> = Result<T, Arc<BrokerError>>;

type Slot<T> = Arc<OnceCell<Shared<T>>>;

/// Deduplicates broker requests for the duration of one run.
#[derive(Debug, Default)]
pub struct ResolutionCache {
    offers: DashMap<(BrokerUrl, OfferId), Slot<Offer>>,
    sellers: DashMap<(BrokerUrl, SellerId), Slot<Seller>>,
    brokers: DashMap<BrokerUrl, Slot<Option<BrokerInfo>>>,
    registers: DashMap<BrokerUrl, Slot<KeyRegister>>,
}

impl ResolutionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn offer(&self, client: &BrokerClient, offer_id: OfferId) -> Shared<Offer> {
        resolve(&self.offers, (client.base().clone(), offer_id), move || async move {
            client.offer(&offer_id).await
        })
        .await
    }

    pub async fn seller(&self, client: &BrokerClient, seller_id: SellerId) -> Shared<Seller> {
        resolve(&self.sellers, (client.base().clone(), seller_id), move || async move {
            client.seller(&seller_id).await
        })
        .await
    }

    /// The broker's reseller record; `Ok(None)` when it has none.
    pub async fn broker(&self, client: &BrokerClient) -> Shared<Option<BrokerInfo>> {
        resolve(&self.brokers, client.base().clone(), move || async move {
            client.broker().await
        })
        .await
    }

    pub async fn register(&self, client: &BrokerClient) -> Shared<KeyRegister> {
        resolve(&self.registers, client.base().clone(), move || async move {
            client.register().await
        })
        .await
    }
}

async fn resolve<K, T, F, Fut>(map: &DashMap<K, Slot<T>>, key: K, fetch: F) -> Shared<T>
where
    K: Eq + Hash,
    T: Clone,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, BrokerError>>,
{
    // Clone the slot out so no map shard lock is held across the await.
    let slot = Arc::clone(&map.entry(key).or_default());
    slot.get_or_init(|| async move { fetch().await.map_err(Arc::new) })
        .await
        .clone()
}
