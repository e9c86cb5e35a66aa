//! # lzero-schema: Schema Registry and Validated Decoding
//!
//! Every record that crosses a trust boundary (a broker response, a
//! receipt or account file, a `licensezero.json` shipped inside a
//! dependency) is checked against a JSON Schema before any code relies on
//! it.
//!
//! - [`SchemaRegistry`] compiles all embedded schemas once. Construction
//!   failure is a startup error. The registry is immutable afterwards and
//!   is passed by reference to whatever needs it.
//! - [`decode`] turns raw bytes into invariant-bearing `lzero-core` types:
//!   parse into a draft whose fields are all optional, validate the draft,
//!   then convert.

pub mod decode;
pub mod registry;

pub use decode::{
    decode_account, decode_broker, decode_manifest, decode_offer, decode_order, decode_receipt,
    decode_register, decode_seller, DecodeError, Manifest, ManifestOffer, OrderCreated,
    SkippedEntry,
};
pub use registry::{SchemaError, SchemaKind, SchemaRegistry, ValidationViolations, Violation};
