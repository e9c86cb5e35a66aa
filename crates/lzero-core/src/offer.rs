//! Offer, seller and broker records served by a broker's public API.

use serde::{Deserialize, Serialize};

use crate::identity::SellerId;

/// A price in the smallest unit of `currency` (cents for USD).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Price {
    pub amount: u64,
    pub currency: String,
}

/// License pricing for an offer.
///
/// `single` is required by the offer schema and always at least 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pricing {
    pub single: Price,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relicense: Option<Price>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site: Option<Price>,
}

/// `GET {broker}/offers/{offerID}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offer {
    /// Homepage of the offered work.
    pub url: String,
    #[serde(rename = "sellerID")]
    pub seller_id: SellerId,
    pub pricing: Pricing,
}

/// Name, e-mail and jurisdiction of a person or company.
///
/// Used for sellers served by `GET {broker}/sellers/{sellerID}` and for the
/// buyer and seller blocks inside receipts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    pub name: String,
    pub email: String,
    /// ISO 3166 code, e.g. `US-CA` or `GB`.
    pub jurisdiction: String,
}

/// `GET {broker}/sellers/{sellerID}`.
pub type Seller = Party;

/// `GET {broker}/broker`: reseller details, absent for brokers that sell
/// only on their own account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrokerInfo {
    pub name: String,
    pub email: String,
    pub jurisdiction: String,
    pub website: String,
}
