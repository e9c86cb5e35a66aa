//! Per-host connection management.

use std::sync::Arc;

use dashmap::DashMap;
use lzero_core::BrokerUrl;
use lzero_schema::SchemaRegistry;
use tokio::sync::Semaphore;

use crate::client::BrokerClient;
use crate::config::BrokerConfig;
use crate::error::BrokerError;

/// Hands out [`BrokerClient`]s that share one HTTP connection pool.
///
/// Requests to the same host (host and port) are capped at
/// `max_connections_per_host` in flight; a slow broker queues its own
/// requests without holding up other brokers.
#[derive(Debug)]
pub struct BrokerPool {
    http: reqwest::Client,
    registry: Arc<SchemaRegistry>,
    per_host: usize,
    hosts: DashMap<String, Arc<Semaphore>>,
}

impl BrokerPool {
    /// # Errors
    ///
    /// Returns [`BrokerError::Client`] if the TLS backend cannot be
    /// initialized.
    pub fn new(config: &BrokerConfig, registry: Arc<SchemaRegistry>) -> Result<Self, BrokerError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .connect_timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .pool_max_idle_per_host(config.max_connections_per_host)
            .build()
            .map_err(BrokerError::Client)?;

        Ok(Self {
            http,
            registry,
            per_host: config.max_connections_per_host.max(1),
            hosts: DashMap::new(),
        })
    }

    /// A client for `base`, limited by its host's semaphore.
    pub fn client(&self, base: &BrokerUrl) -> BrokerClient {
        let limit = Arc::clone(
            &self
                .hosts
                .entry(base.authority())
                .or_insert_with(|| Arc::new(Semaphore::new(self.per_host))),
        );
        BrokerClient::new(self.http.clone(), base.clone(), Arc::clone(&self.registry))
            .with_limit(limit)
    }

    pub fn registry(&self) -> &Arc<SchemaRegistry> {
        &self.registry
    }

    /// Number of distinct hosts seen so far.
    pub fn host_count(&self) -> usize {
        self.hosts.len()
    }
}
