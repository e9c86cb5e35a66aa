//! Typed client for one broker.

use std::sync::Arc;

use lzero_core::{BrokerInfo, BrokerUrl, KeyRegister, Offer, OfferId, OrderId, Receipt, Seller, SellerId};
use lzero_schema::{
    decode_broker, decode_offer, decode_order, decode_receipt, decode_register, decode_seller,
    DecodeError, OrderCreated, SchemaRegistry,
};
use serde::Serialize;
use tokio::sync::Semaphore;

use crate::error::BrokerError;

/// Body of `POST {broker}/buy`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderRequest {
    #[serde(rename = "offerIDs")]
    pub offer_ids: Vec<OfferId>,
    pub name: String,
    pub email: String,
    pub jurisdiction: String,
}

/// Client for a single broker's API.
///
/// Cheap to clone. All clones share the HTTP connection pool and, when
/// obtained from a [`BrokerPool`](crate::BrokerPool), the host's
/// concurrency limit.
#[derive(Debug, Clone)]
pub struct BrokerClient {
    http: reqwest::Client,
    base: BrokerUrl,
    registry: Arc<SchemaRegistry>,
    limit: Option<Arc<Semaphore>>,
}

impl BrokerClient {
    /// A client with no per-host concurrency limit.
    pub fn new(http: reqwest::Client, base: BrokerUrl, registry: Arc<SchemaRegistry>) -> Self {
        Self {
            http,
            base,
            registry,
            limit: None,
        }
    }

    pub(crate) fn with_limit(mut self, limit: Arc<Semaphore>) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn base(&self) -> &BrokerUrl {
        &self.base
    }

    /// Fetch an offer.
    ///
    /// Calls `GET {base}/offers/{offerID}`.
    pub async fn offer(&self, offer_id: &OfferId) -> Result<Offer, BrokerError> {
        tracing::debug!(broker = %self.base, offer_id = %offer_id, "fetching offer");
        self.get(&format!("offers/{offer_id}"), decode_offer).await
    }

    /// Fetch a seller.
    ///
    /// Calls `GET {base}/sellers/{sellerID}`.
    pub async fn seller(&self, seller_id: &SellerId) -> Result<Seller, BrokerError> {
        tracing::debug!(broker = %self.base, seller_id = %seller_id, "fetching seller");
        self.get(&format!("sellers/{seller_id}"), decode_seller).await
    }

    /// Fetch reseller details.
    ///
    /// Calls `GET {base}/broker`. Brokers that sell only on their own
    /// account answer 404, which is `Ok(None)`.
    pub async fn broker(&self) -> Result<Option<BrokerInfo>, BrokerError> {
        tracing::debug!(broker = %self.base, "fetching reseller record");
        let (endpoint, body) = match self.fetch(reqwest::Method::GET, "broker", None::<&()>, true).await? {
            Some(found) => found,
            None => return Ok(None),
        };
        decode_broker(&self.registry, &body)
            .map(Some)
            .map_err(|e| BrokerError::from_decode(endpoint, e))
    }

    /// Fetch the key register.
    ///
    /// Calls `GET {base}/register`.
    pub async fn register(&self) -> Result<KeyRegister, BrokerError> {
        tracing::debug!(broker = %self.base, "fetching key register");
        self.get("register", decode_register).await
    }

    /// Fetch the most recent receipt issued for an order. Used to renew
    /// recurring licenses.
    ///
    /// Calls `GET {base}/orders/{orderID}/latest`. The receipt is only
    /// structurally checked; callers verify it.
    pub async fn latest_receipt(&self, order_id: &OrderId) -> Result<Receipt, BrokerError> {
        tracing::debug!(broker = %self.base, order_id = %order_id, "fetching latest receipt");
        self.get(&format!("orders/{order_id}/latest"), decode_receipt)
            .await
    }

    /// Open an order for one or more offers.
    ///
    /// Calls `POST {base}/buy` and returns where the buyer completes it.
    pub async fn order(&self, request: &OrderRequest) -> Result<OrderCreated, BrokerError> {
        tracing::info!(broker = %self.base, offers = request.offer_ids.len(), "creating order");
        let (endpoint, body) = self
            .fetch(reqwest::Method::POST, "buy", Some(request), false)
            .await?
            .ok_or_else(|| BrokerError::Status {
                endpoint: format!("POST {}", self.base),
                status: 404,
            })?;
        decode_order(&self.registry, &body).map_err(|e| BrokerError::from_decode(endpoint, e))
    }

    async fn get<T>(
        &self,
        path: &str,
        decode: fn(&SchemaRegistry, &[u8]) -> Result<T, DecodeError>,
    ) -> Result<T, BrokerError> {
        let (endpoint, body) = self
            .fetch(reqwest::Method::GET, path, None::<&()>, false)
            .await?
            .ok_or_else(|| BrokerError::Status {
                endpoint: format!("GET {}", self.describe(path)),
                status: 404,
            })?;
        decode(&self.registry, &body).map_err(|e| BrokerError::from_decode(endpoint, e))
    }

    /// Send a request and read the body. Returns `Ok(None)` for a 404 when
    /// `not_found_is_none` is set.
    async fn fetch<B: Serialize + ?Sized>(
        &self,
        method: reqwest::Method,
        path: &str,
        json: Option<&B>,
        not_found_is_none: bool,
    ) -> Result<Option<(String, Vec<u8>)>, BrokerError> {
        let endpoint = format!("{method} {}", self.describe(path));
        let url = self.base.endpoint(path).map_err(|e| BrokerError::Request {
            endpoint: endpoint.clone(),
            reason: e.to_string(),
        })?;

        let _permit = match &self.limit {
            Some(limit) => Some(limit.acquire().await.map_err(|_| BrokerError::Cancelled {
                endpoint: endpoint.clone(),
            })?),
            None => None,
        };

        let mut request = self.http.request(method, url);
        if let Some(body) = json {
            request = request.json(body);
        }
        let resp = request.send().await.map_err(|e| BrokerError::Transport {
            endpoint: endpoint.clone(),
            source: e,
        })?;

        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND && not_found_is_none {
            return Ok(None);
        }
        if !status.is_success() {
            tracing::warn!(endpoint = %endpoint, status = status.as_u16(), "broker returned error status");
            return Err(BrokerError::Status {
                endpoint,
                status: status.as_u16(),
            });
        }

        let body = resp.bytes().await.map_err(|e| BrokerError::Transport {
            endpoint: endpoint.clone(),
            source: e,
        })?;
        Ok(Some((endpoint, body.to_vec())))
    }

    fn describe(&self, path: &str) -> String {
        format!("{}/{path}", self.base)
    }
}
