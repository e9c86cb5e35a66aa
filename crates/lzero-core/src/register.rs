//! # Key Register
//!
//! A broker publishes the Ed25519 keys it has signed receipts with and the
//! interval each key was in use. A receipt is only trustworthy if it was
//! signed by a registered key and its `effective` date falls inside that
//! key's interval.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::temporal::Timestamp;

/// Validity interval of one signing key. Both bounds are inclusive.
/// `through` is absent while the key is still in use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeframe {
    pub from: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub through: Option<Timestamp>,
}

/// `GET {broker}/register`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyRegister {
    pub updated: Timestamp,
    /// Lowercase hex public key to validity interval.
    pub keys: BTreeMap<String, Timeframe>,
}

impl KeyRegister {
    /// Look up the interval for a hex-encoded public key.
    ///
    /// Hex case is not significant.
    pub fn timeframe(&self, key_hex: &str) -> Option<&Timeframe> {
        self.keys
            .get(key_hex)
            .or_else(|| self.keys.get(&key_hex.to_ascii_lowercase()))
    }
}
