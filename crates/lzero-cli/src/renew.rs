//! # `licensezero renew`
//!
//! Recurring licenses carry an `expires` date. For each, fetch the
//! broker's latest receipt for the same order, verify it, and save it
//! over the stored one when it took effect later.

use anyhow::Result;
use clap::Args;
use lzero_core::Receipt;
use lzero_inventory::{IdentityStore, StoredReceipt};
use lzero_trust::verify_receipt;

use crate::session::Session;

#[derive(Args, Debug, Clone, Default)]
pub struct RenewArgs {}

/// What happened to one recurring receipt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Renewal {
    /// A newer receipt was verified and saved.
    Renewed,
    /// The broker has nothing newer.
    Current,
    Failed(String),
}

pub async fn renew_one(session: &Session, stored: &StoredReceipt) -> Renewal {
    match fetch_newer(session, &stored.receipt).await {
        Ok(Some(latest)) => match IdentityStore::replace_receipt(&stored.path, &latest) {
            Ok(()) => Renewal::Renewed,
            Err(e) => Renewal::Failed(e.to_string()),
        },
        Ok(None) => Renewal::Current,
        Err(reason) => Renewal::Failed(reason),
    }
}

/// The broker's latest receipt for this order, if it is valid and newer.
async fn fetch_newer(session: &Session, current: &Receipt) -> Result<Option<Receipt>, String> {
    let broker = current.broker_url().map_err(|e| e.to_string())?;
    let client = session.pool.client(&broker);

    let latest = client
        .latest_receipt(&current.order_id())
        .await
        .map_err(|e| e.to_string())?;
    if latest.offer_id() != current.offer_id() || latest.order_id() != current.order_id() {
        return Err(format!(
            "broker returned a receipt for order {} offer {}",
            latest.order_id(),
            latest.offer_id()
        ));
    }
    if latest.broker_url().ok().as_ref() != Some(&broker) {
        return Err(format!("broker returned a receipt issued by {}", latest.license.values.api));
    }

    let register = session
        .cache
        .register(&client)
        .await
        .map_err(|e| format!("cannot fetch key register: {e}"))?;
    verify_receipt(&latest, &register, &session.registry).map_err(|e| e.to_string())?;

    let newer = match (latest.effective(), current.effective()) {
        (Ok(latest), Ok(current)) => latest > current,
        (Ok(_), Err(_)) => true,
        (Err(e), _) => return Err(e.to_string()),
    };
    Ok(newer.then_some(latest))
}

pub async fn run_renew(_args: &RenewArgs, session: &Session) -> Result<u8> {
    let store = session.load_store()?;

    let mut failed = 0usize;
    let mut recurring = 0usize;
    for stored in store.receipts.iter().filter(|s| s.receipt.is_recurring()) {
        recurring += 1;
        let path = stored.path.display();
        match renew_one(session, stored).await {
            Renewal::Renewed => println!("OK: {path}: renewed"),
            Renewal::Current => println!("OK: {path}: current"),
            Renewal::Failed(reason) => {
                failed += 1;
                println!("FAIL: {path}: {reason}");
            }
        }
    }
    if recurring == 0 {
        println!("No recurring licenses to renew.");
    }
    Ok(if failed == 0 { 0 } else { 1 })
}
