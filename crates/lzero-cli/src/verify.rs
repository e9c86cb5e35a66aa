//! # `licensezero verify`
//!
//! Re-verifies every saved receipt against its broker's key register.
//! Each broker's register is fetched once.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use lzero_core::{OfferId, Receipt};
use lzero_inventory::StoredReceipt;
use lzero_trust::verify_receipt;
use serde::Serialize;

use crate::session::Session;

#[derive(Args, Debug, Clone, Default)]
pub struct VerifyArgs {
    /// Print results as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Outcome for one receipt.
#[derive(Debug, Clone, Serialize)]
pub struct ReceiptCheck {
    pub path: PathBuf,
    #[serde(rename = "offerID")]
    pub offer_id: OfferId,
    pub ok: bool,
    /// Machine-readable failure class: `malformed`, `bad-signature`,
    /// `unknown-key`, `backdated`, `postdated` or `unavailable`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ReceiptCheck {
    fn ok(path: PathBuf, offer_id: OfferId) -> Self {
        Self {
            path,
            offer_id,
            ok: true,
            failure: None,
            reason: None,
        }
    }

    fn failed(path: PathBuf, offer_id: OfferId, failure: &'static str, reason: String) -> Self {
        Self {
            path,
            offer_id,
            ok: false,
            failure: Some(failure),
            reason: Some(reason),
        }
    }
}

/// Verify one receipt, fetching its broker's register through the
/// session cache.
pub async fn check_receipt(session: &Session, path: PathBuf, receipt: &Receipt) -> ReceiptCheck {
    let offer_id = receipt.offer_id();
    let broker = match receipt.broker_url() {
        Ok(broker) => broker,
        Err(e) => return ReceiptCheck::failed(path, offer_id, "malformed", e.to_string()),
    };
    let client = session.pool.client(&broker);
    let register = match session.cache.register(&client).await {
        Ok(register) => register,
        Err(e) => {
            return ReceiptCheck::failed(
                path,
                offer_id,
                "unavailable",
                format!("cannot fetch key register: {e}"),
            )
        }
    };
    match verify_receipt(receipt, &register, &session.registry) {
        Ok(()) => ReceiptCheck::ok(path, offer_id),
        Err(e) => ReceiptCheck::failed(path, offer_id, e.code(), e.to_string()),
    }
}

pub async fn run_verify(args: &VerifyArgs, session: &Session) -> Result<u8> {
    let store = session.load_store()?;

    let mut checks = Vec::with_capacity(store.receipts.len());
    for StoredReceipt { path, receipt } in &store.receipts {
        checks.push(check_receipt(session, path.clone(), receipt).await);
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&checks)?);
    } else if checks.is_empty() {
        println!("No receipts in {}.", session.store.receipts_dir().display());
    } else {
        for check in &checks {
            match &check.reason {
                None => println!("OK: {}", check.path.display()),
                Some(reason) => println!("FAIL: {}: {reason}", check.path.display()),
            }
        }
    }

    let failed = checks.iter().filter(|c| !c.ok).count();
    tracing::info!(receipts = checks.len(), failed, "verification complete");
    Ok(if failed == 0 { 0 } else { 1 })
}
