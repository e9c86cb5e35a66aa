//! # lzero-trust: Receipt Verification
//!
//! Decides whether a stored or freshly fetched receipt can be trusted.
//! Verification is pure: it needs the receipt, the issuing broker's key
//! register and the schema registry, and performs no I/O.
//!
//! See [`verify_receipt`] for the check order.

pub mod error;
pub mod verify;

pub use error::{TrustError, TrustFailure};
pub use verify::{check_key_window, verify_receipt};
