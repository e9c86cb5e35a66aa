//! # lzero-inventory: Discovery and Classification
//!
//! Turns a project directory into an [`Inventory`]: which dependencies
//! are licensed, owned, ignorable under policy, or still need a license.
//!
//! ## Pipeline
//!
//! 1. [`Locator`] runs every [`DiscoveryStrategy`] and merges their
//!    [`Finding`]s, keeping the first report of each `(broker, offerID)`.
//! 2. [`IdentityStore`] loads the user's receipts and seller accounts.
//! 3. [`Classifier`] resolves every finding against its broker
//!    concurrently and sorts it into exactly one bucket.
//!
//! Discovery is best-effort per strategy. Broker failures degrade single
//! findings to invalid. Only an unreadable project root or identity store
//! aborts the run.

pub mod classify;
pub mod command;
pub mod error;
pub mod finding;
pub mod locator;
pub mod store;
pub mod strategy;

pub use classify::{Bucket, Classifier, InvalidItem, Inventory, Item, Policy};
pub use command::{CommandRunner, SystemCommandRunner, DEFAULT_TOOL_TIMEOUT};
pub use error::{DiscoveryError, StoreError};
pub use finding::{Finding, PackageMeta};
pub use locator::Locator;
pub use store::{IdentityStore, StoreConfig, StoredReceipt};
pub use strategy::DiscoveryStrategy;
