//! # lzero-crypto: Receipt Signatures
//!
//! Ed25519 signing and verification for License Zero receipts. Brokers sign
//! the canonical JSON of a receipt's `license` object; this crate checks
//! those signatures and, for tests and local tooling, produces them.
//!
//! ## Crate Policy
//!
//! - Depends only on `lzero-core` internally.
//! - Message input is always `&CanonicalBytes`, never raw bytes.
//! - No mocking of cryptographic operations in tests.

pub mod ed25519;
pub mod error;

pub use ed25519::{verify, verify_with_public_key, Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature};
pub use error::CryptoError;
