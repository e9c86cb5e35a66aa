//! # Public License Families
//!
//! Works sold through License Zero are also available under a public
//! license. Which family that license belongs to decides whether a project
//! may skip buying: noncommercial projects can ignore noncommercial-licensed
//! work, open source projects can ignore reciprocal-licensed work.
//!
//! The table is closed. Anything not listed is `Unknown` and never ignored.

use serde::{Deserialize, Serialize};

/// Classification of a public license identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublicLicenseFamily {
    /// Share-alike terms that free open source projects can satisfy.
    Reciprocal,
    /// Free for noncommercial use only.
    Noncommercial,
    Unknown,
}

const RECIPROCAL: &[&str] = &["Parity-5.0.0", "Parity-6.0.0", "Parity-7.0.0"];

const NONCOMMERCIAL: &[&str] = &[
    "Prosperity-2.0.0",
    "Prosperity-3.0.0",
    "PolyForm-Noncommercial-1.0.0",
    "PolyForm-Strict-1.0.0",
];

impl PublicLicenseFamily {
    /// Classify an SPDX-style identifier. Matching is exact.
    pub fn classify(identifier: &str) -> Self {
        let identifier = identifier.trim();
        if RECIPROCAL.contains(&identifier) {
            Self::Reciprocal
        } else if NONCOMMERCIAL.contains(&identifier) {
            Self::Noncommercial
        } else {
            Self::Unknown
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reciprocal => "reciprocal",
            Self::Noncommercial => "noncommercial",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for PublicLicenseFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
