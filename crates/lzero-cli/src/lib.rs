//! # lzero-cli: the `licensezero` Command-Line Tool
//!
//! ## Subcommands
//!
//! - `licensezero quote`: list License Zero dependencies and what they
//!   would cost.
//! - `licensezero buy`: open orders for every unlicensed dependency.
//! - `licensezero verify`: check every saved receipt.
//! - `licensezero renew`: fetch and save the latest receipts for
//!   recurring licenses.
//!
//! ## Crate Policy
//!
//! - Argument parsing lives in `main.rs`; handlers here take parsed args.
//! - Handlers return `anyhow::Result<u8>`: `Ok(0)` for a clean run,
//!   `Ok(1)` when something needs attention, `Err` when the run itself
//!   could not proceed.
//! - Command output goes to stdout, logs to stderr.

pub mod buy;
pub mod policy;
pub mod quote;
pub mod renew;
pub mod session;
pub mod verify;

pub use session::Session;
