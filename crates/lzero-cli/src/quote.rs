//! # `licensezero quote`
//!
//! Lists every License Zero dependency by bucket and totals the
//! single-license price of what is still unlicensed, per currency.

use std::collections::BTreeMap;

use anyhow::Result;
use clap::Args;
use lzero_inventory::{Inventory, Item};
use serde::Serialize;

use crate::policy::PolicyArgs;
use crate::session::Session;

#[derive(Args, Debug, Clone, Default)]
pub struct QuoteArgs {
    #[command(flatten)]
    pub policy: PolicyArgs,

    /// Print the full inventory as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct QuoteReport<'a> {
    #[serde(flatten)]
    inventory: &'a Inventory,
    /// Currency code to total amount in minor units.
    totals: BTreeMap<String, u128>,
}

/// Sum single-license prices of unlicensed items per currency.
///
/// Sums are `u128`: each broker price may be any `u64`.
pub fn totals(items: &[Item]) -> BTreeMap<String, u128> {
    let mut totals = BTreeMap::new();
    for item in items {
        let single = &item.offer.pricing.single;
        let total = totals.entry(single.currency.clone()).or_insert(0u128);
        *total = total.saturating_add(u128::from(single.amount));
    }
    totals
}

pub async fn run_quote(args: &QuoteArgs, session: &Session) -> Result<u8> {
    let inventory = session.inventory(args.policy.policy()).await?;

    if args.json {
        let report = QuoteReport {
            inventory: &inventory,
            totals: totals(&inventory.unlicensed),
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&inventory);
    }

    Ok(if inventory.is_clean() { 0 } else { 1 })
}

pub(crate) fn print_summary(inventory: &Inventory) {
    println!("License Zero dependencies: {}", inventory.licensable.len());
    println!("  licensed:   {}", inventory.licensed.len());
    println!("  own:        {}", inventory.own.len());
    println!("  ignored:    {}", inventory.ignored.len());
    println!("  unlicensed: {}", inventory.unlicensed.len());
    if !inventory.invalid.is_empty() {
        println!("  invalid:    {}", inventory.invalid.len());
    }

    if !inventory.unlicensed.is_empty() {
        println!();
        println!("Unlicensed:");
        for item in &inventory.unlicensed {
            let single = &item.offer.pricing.single;
            println!(
                "  {} ({}) from {}: {} {}",
                item.finding.label(),
                item.finding.public,
                item.seller.name,
                single.amount,
                single.currency
            );
        }
        for (currency, amount) in totals(&inventory.unlicensed) {
            println!("Total: {amount} {currency}");
        }
    }

    if !inventory.invalid.is_empty() {
        println!();
        println!("Invalid:");
        for invalid in &inventory.invalid {
            println!("  FAIL: {}: {}", invalid.finding.label(), invalid.reason);
        }
    }
}
