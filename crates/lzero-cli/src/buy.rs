//! # `licensezero buy`
//!
//! Opens one order per broker for every unlicensed dependency and prints
//! where to complete each. Payment happens on the broker's site.

use std::collections::BTreeMap;

use anyhow::Result;
use clap::Args;
use lzero_broker::OrderRequest;
use lzero_core::{BrokerUrl, OfferId};
use lzero_inventory::Item;

use crate::policy::PolicyArgs;
use crate::quote::print_summary;
use crate::session::Session;

#[derive(Args, Debug, Clone)]
pub struct BuyArgs {
    /// Licensee name.
    #[arg(long)]
    pub name: String,

    /// Licensee e-mail address.
    #[arg(long)]
    pub email: String,

    /// Licensee jurisdiction, e.g. `US-CA` or `GB`.
    #[arg(long)]
    pub jurisdiction: String,

    #[command(flatten)]
    pub policy: PolicyArgs,
}

/// Unlicensed offers grouped by the broker that sells them.
pub fn orders_by_broker(items: &[Item]) -> BTreeMap<BrokerUrl, Vec<OfferId>> {
    let mut orders: BTreeMap<BrokerUrl, Vec<OfferId>> = BTreeMap::new();
    for item in items {
        orders
            .entry(item.finding.broker.clone())
            .or_default()
            .push(item.finding.offer_id);
    }
    orders
}

pub async fn run_buy(args: &BuyArgs, session: &Session) -> Result<u8> {
    let inventory = session.inventory(args.policy.policy()).await?;
    print_summary(&inventory);

    let mut code = if inventory.invalid.is_empty() { 0 } else { 1 };
    if inventory.unlicensed.is_empty() {
        println!();
        println!("Nothing to buy.");
        return Ok(code);
    }

    println!();
    for (broker, offer_ids) in orders_by_broker(&inventory.unlicensed) {
        let request = OrderRequest {
            offer_ids,
            name: args.name.clone(),
            email: args.email.clone(),
            jurisdiction: args.jurisdiction.clone(),
        };
        match session.pool.client(&broker).order(&request).await {
            Ok(created) => println!("OK: {broker}: complete your order at {}", created.location),
            Err(e) => {
                tracing::error!(broker = %broker, error = %e, "order failed");
                println!("FAIL: {broker}: {e}");
                code = 1;
            }
        }
    }
    Ok(code)
}
