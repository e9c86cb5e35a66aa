//! Cryptographic error types.

use thiserror::Error;

/// Error in key parsing or signature verification.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Hex text could not be decoded, or decoded to the wrong length.
    #[error("invalid hex for {what}: {reason}")]
    InvalidHex {
        /// `public key` or `signature`.
        what: &'static str,
        reason: String,
    },

    /// The bytes are not a valid Ed25519 public key.
    #[error("invalid public key: {0}")]
    InvalidKey(String),

    /// The signature does not match the message under the key.
    #[error("signature verification failed: {0}")]
    VerificationFailed(String),
}
