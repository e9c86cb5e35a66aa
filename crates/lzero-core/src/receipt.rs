//! # Receipts
//!
//! A receipt is a broker's signed statement that a buyer holds a license
//! for one offer. It is stored as:
//!
//! ```json
//! {"key": "<64 hex>", "signature": "<128 hex>", "license": {"form": "...", "values": {...}}}
//! ```
//!
//! ## Security Invariant
//!
//! The signature covers the canonical JSON of `license`, not the file
//! bytes. Every struct here rejects unknown fields and omits absent
//! optionals, so re-serializing a decoded receipt reproduces exactly what
//! the broker signed. A field this type did not know about would otherwise
//! be dropped and the signature would stop verifying for no visible reason.

use serde::{Deserialize, Serialize};

use crate::canonical::CanonicalBytes;
use crate::error::{CanonicalizationError, ValidationError};
use crate::identity::{BrokerUrl, OfferId, OrderId, SellerId};
use crate::offer::{BrokerInfo, Party, Price};
use crate::temporal::Timestamp;

/// Terms of the license a receipt grants.
///
/// Timestamps and the API URL stay in the exact textual form the broker
/// signed; use the accessor methods to get parsed values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LicenseValues {
    /// Base URL of the issuing broker.
    pub api: String,
    /// RFC 3339 instant the license took effect.
    pub effective: String,
    /// RFC 3339 instant a recurring license lapses.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<String>,
    #[serde(rename = "offerID")]
    pub offer_id: OfferId,
    #[serde(rename = "orderID")]
    pub order_id: OrderId,
    #[serde(rename = "sellerID")]
    pub seller_id: SellerId,
    pub buyer: Party,
    pub seller: Party,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub broker: Option<BrokerInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Price>,
}

/// The signed portion of a receipt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct License {
    /// Full text of the license form the values fill in.
    pub form: String,
    pub values: LicenseValues,
}

/// A license receipt as issued by a broker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Receipt {
    /// Hex-encoded Ed25519 public key of the signer.
    pub key: String,
    /// Hex-encoded detached Ed25519 signature over the canonical `license`.
    pub signature: String,
    pub license: License,
}

impl Receipt {
    /// The bytes the broker signed: canonical JSON of `license` alone.
    pub fn signed_bytes(&self) -> Result<CanonicalBytes, CanonicalizationError> {
        CanonicalBytes::new(&self.license)
    }

    /// Canonical JSON of the whole receipt, as written to disk.
    pub fn canonical(&self) -> Result<CanonicalBytes, CanonicalizationError> {
        CanonicalBytes::new(self)
    }

    /// The issuing broker.
    pub fn broker_url(&self) -> Result<BrokerUrl, ValidationError> {
        BrokerUrl::parse(&self.license.values.api)
    }

    /// When the license took effect.
    pub fn effective(&self) -> Result<Timestamp, ValidationError> {
        Timestamp::parse(&self.license.values.effective)
    }

    /// When a recurring license lapses, if it does.
    pub fn expires(&self) -> Result<Option<Timestamp>, ValidationError> {
        self.license
            .values
            .expires
            .as_deref()
            .map(Timestamp::parse)
            .transpose()
    }

    /// Recurring licenses carry an expiration and can be renewed.
    pub fn is_recurring(&self) -> bool {
        self.license.values.expires.is_some()
    }

    pub fn offer_id(&self) -> OfferId {
        self.license.values.offer_id
    }

    pub fn order_id(&self) -> OrderId {
        self.license.values.order_id
    }
}
