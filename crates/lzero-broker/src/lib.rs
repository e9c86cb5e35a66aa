//! # lzero-broker: License Zero Broker Client
//!
//! Typed access to a broker's public API:
//!
//! | Method | Path | Operation |
//! |--------|------|-----------|
//! | GET  | `/offers/{offerID}` | [`BrokerClient::offer`] |
//! | GET  | `/sellers/{sellerID}` | [`BrokerClient::seller`] |
//! | GET  | `/broker` | [`BrokerClient::broker`] (404 means none) |
//! | GET  | `/register` | [`BrokerClient::register`] |
//! | GET  | `/orders/{orderID}/latest` | [`BrokerClient::latest_receipt`] |
//! | POST | `/buy` | [`BrokerClient::order`] |
//!
//! Every response body is decoded through `lzero-schema` before it is
//! returned. Transport failures and invalid responses are separate error
//! variants so callers can tell an unreachable broker from a broken one.
//!
//! No request is retried here. Every request carries the configured
//! timeout.

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod pool;

pub use cache::ResolutionCache;
pub use client::{BrokerClient, OrderRequest};
pub use config::{BrokerConfig, ConfigError};
pub use error::BrokerError;
pub use pool::BrokerPool;
