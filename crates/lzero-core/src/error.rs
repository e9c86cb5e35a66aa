//! # Error Types
//!
//! Errors raised while constructing core values. Every error carries the
//! offending input so a user can tell which file or response was bad.

use thiserror::Error;

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// Float values have no single canonical number form and are refused.
    /// Prices are integer amounts of the smallest currency unit.
    #[error("float values are not permitted in canonical representations: {0}")]
    FloatRejected(f64),

    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

/// Validation errors for identifier newtypes and timestamps.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Broker base URL is not an absolute https URL.
    #[error("invalid broker URL \"{input}\": {reason}")]
    InvalidBrokerUrl {
        /// The rejected input.
        input: String,
        /// Why it was rejected.
        reason: String,
    },

    /// An identifier that must be a UUID is not one.
    #[error("invalid {kind} \"{input}\" (expected a UUID)")]
    InvalidUuid {
        /// Which identifier was being parsed (`offerID`, `sellerID`, ...).
        kind: &'static str,
        /// The rejected input.
        input: String,
    },

    /// A timestamp is not valid RFC 3339.
    #[error("invalid RFC 3339 timestamp \"{input}\": {reason}")]
    InvalidTimestamp {
        /// The rejected input.
        input: String,
        /// Parser message.
        reason: String,
    },
}
