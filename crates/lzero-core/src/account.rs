//! Seller accounts: proof that the local user is the seller behind offers
//! on a broker, so their own work needs no receipt.

use serde::{Deserialize, Serialize};

use crate::identity::{BrokerUrl, SellerId};

/// One `accounts/*.json` file: `{"server", "sellerID", "token"}`.
///
/// Custom `Debug` redacts the token so it never reaches log output.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub server: BrokerUrl,
    #[serde(rename = "sellerID")]
    pub seller_id: SellerId,
    pub token: String,
}

impl Account {
    /// True when this account is the given seller on the given broker.
    pub fn is_seller(&self, broker: &BrokerUrl, seller_id: &SellerId) -> bool {
        &self.server == broker && &self.seller_id == seller_id
    }
}

impl std::fmt::Debug for Account {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Account")
            .field("server", &self.server)
            .field("seller_id", &self.seller_id)
            .field("token", &"[REDACTED]")
            .finish()
    }
}
