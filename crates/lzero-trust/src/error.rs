//! Why a receipt was rejected.

use lzero_core::Timestamp;
use thiserror::Error;

/// Broad class of a verification failure. The remediation differs per
/// class: fix the file, distrust the broker, or fetch a fresher receipt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrustFailure {
    /// The receipt is not structurally valid.
    Schema,
    /// The signature does not verify.
    Signature,
    /// Signature is fine but the key was not valid when the license took
    /// effect.
    KeyWindow,
}

/// A receipt failed verification.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TrustError {
    /// The receipt does not match the receipt schema.
    #[error("malformed receipt: {0}")]
    Malformed(String),

    /// Key or signature is not valid hex, the key is not a curve point, or
    /// the signature does not match the license.
    #[error("bad signature: {0}")]
    BadSignature(String),

    /// The signing key is not listed in the broker's register.
    #[error("unknown signing key {key}")]
    UnknownKey { key: String },

    /// The license took effect before the signing key came into use.
    #[error("backdated: effective {effective} precedes key validity from {from}")]
    Backdated {
        effective: Timestamp,
        from: Timestamp,
    },

    /// The license took effect after the signing key was retired.
    #[error("postdated: effective {effective} follows key validity through {through}")]
    Postdated {
        effective: Timestamp,
        through: Timestamp,
    },
}

impl TrustError {
    pub fn failure(&self) -> TrustFailure {
        match self {
            Self::Malformed(_) => TrustFailure::Schema,
            Self::BadSignature(_) => TrustFailure::Signature,
            Self::UnknownKey { .. } | Self::Backdated { .. } | Self::Postdated { .. } => {
                TrustFailure::KeyWindow
            }
        }
    }

    /// Short machine-readable reason, used in JSON output.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Malformed(_) => "malformed",
            Self::BadSignature(_) => "bad-signature",
            Self::UnknownKey { .. } => "unknown-key",
            Self::Backdated { .. } => "backdated",
            Self::Postdated { .. } => "postdated",
        }
    }
}
