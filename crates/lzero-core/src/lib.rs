//! # lzero-core: Foundational Types for License Zero Tooling
//!
//! This crate is the leaf of the workspace DAG. It defines the record types
//! exchanged with License Zero brokers and stored on disk, plus the two
//! primitives every signature path depends on.
//!
//! ## Key Design Principles
//!
//! 1. **`CanonicalBytes` newtype.** Receipt signatures cover the RFC 8785
//!    canonical form of the `license` object. All signed or verified bytes
//!    flow through `CanonicalBytes::new()`; there is no other constructor.
//!
//! 2. **Newtype identifiers.** `OfferId`, `SellerId`, `OrderId` and
//!    `BrokerUrl` cannot be confused with one another or with bare strings.
//!
//! 3. **UTC timestamps.** `Timestamp` normalizes any RFC 3339 offset to UTC
//!    so that key validity windows compare instants, not strings.
//!
//! 4. **Records carry no trust.** Types here describe shapes only. Whether a
//!    record came from a schema-valid response or a signed receipt is decided
//!    by `lzero-schema` and `lzero-trust`.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `lzero-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod account;
pub mod canonical;
pub mod error;
pub mod identity;
pub mod offer;
pub mod public_license;
pub mod receipt;
pub mod register;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use account::Account;
pub use canonical::CanonicalBytes;
pub use error::{CanonicalizationError, ValidationError};
pub use identity::{BrokerUrl, OfferId, OrderId, SellerId};
pub use offer::{BrokerInfo, Offer, Party, Price, Pricing, Seller};
pub use public_license::PublicLicenseFamily;
pub use receipt::{License, LicenseValues, Receipt};
pub use register::{KeyRegister, Timeframe};
pub use temporal::Timestamp;
