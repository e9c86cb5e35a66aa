//! # Schema Registry
//!
//! Compiled JSON Schema (Draft 2020-12) validators for every record kind.
//!
//! ## Security Invariant
//!
//! Schema validation is a trust boundary. A document that fails validation
//! is rejected with the instance path, schema path and message of every
//! violation, never partially accepted.
//!
//! Schemas are embedded at compile time and never loaded from the network.
//! A retriever that refuses every URI is installed so a stray remote `$ref`
//! fails registry construction instead of triggering a request.

use std::collections::HashMap;
use std::fmt;

use jsonschema::{Retrieve, Uri, Validator};
use serde_json::Value;
use thiserror::Error;

/// The record kinds the registry can validate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaKind {
    Offer,
    Seller,
    Broker,
    Register,
    Receipt,
    Account,
    /// `licensezero.json` files embedded in packages.
    Manifest,
    /// Response to `POST {broker}/buy`.
    Order,
}

impl SchemaKind {
    pub const ALL: [SchemaKind; 8] = [
        SchemaKind::Offer,
        SchemaKind::Seller,
        SchemaKind::Broker,
        SchemaKind::Register,
        SchemaKind::Receipt,
        SchemaKind::Account,
        SchemaKind::Manifest,
        SchemaKind::Order,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Offer => "offer",
            Self::Seller => "seller",
            Self::Broker => "broker",
            Self::Register => "register",
            Self::Receipt => "receipt",
            Self::Account => "account",
            Self::Manifest => "licensezero.json",
            Self::Order => "order",
        }
    }

    /// File name under `schemas/`.
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Offer => "offer.schema.json",
            Self::Seller => "seller.schema.json",
            Self::Broker => "broker.schema.json",
            Self::Register => "register.schema.json",
            Self::Receipt => "receipt.schema.json",
            Self::Account => "account.schema.json",
            Self::Manifest => "licensezero.schema.json",
            Self::Order => "order.schema.json",
        }
    }

    fn source(&self) -> &'static str {
        match self {
            Self::Offer => include_str!("../../../schemas/offer.schema.json"),
            Self::Seller => include_str!("../../../schemas/seller.schema.json"),
            Self::Broker => include_str!("../../../schemas/broker.schema.json"),
            Self::Register => include_str!("../../../schemas/register.schema.json"),
            Self::Receipt => include_str!("../../../schemas/receipt.schema.json"),
            Self::Account => include_str!("../../../schemas/account.schema.json"),
            Self::Manifest => include_str!("../../../schemas/licensezero.schema.json"),
            Self::Order => include_str!("../../../schemas/order.schema.json"),
        }
    }
}

impl fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error from schema compilation or validation.
#[derive(Error, Debug, Clone)]
pub enum SchemaError {
    /// The document did not conform to the schema.
    #[error("{kind} failed schema validation:\n{violations}")]
    ValidationFailed {
        kind: SchemaKind,
        violations: ValidationViolations,
    },

    /// An embedded schema is not valid JSON or not a valid schema.
    #[error("cannot compile {kind} schema: {reason}")]
    BuildFailed { kind: SchemaKind, reason: String },
}

impl SchemaError {
    /// The record kind the error is about.
    pub fn kind(&self) -> SchemaKind {
        match self {
            Self::ValidationFailed { kind, .. } | Self::BuildFailed { kind, .. } => *kind,
        }
    }
}

/// A single validation violation with structured context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// JSON Pointer path to the violating field in the instance.
    pub instance_path: String,
    /// JSON Pointer path within the schema that triggered the error.
    pub schema_path: String,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_empty() {
            write!(f, "  (root): {}", self.message)
        } else {
            write!(f, "  {}: {}", self.instance_path, self.message)
        }
    }
}

/// Collection of validation violations. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationViolations {
    violations: Vec<Violation>,
}

impl ValidationViolations {
    /// A single violation found outside the schema engine, e.g. while
    /// converting a validated draft into its typed record.
    pub fn single(instance_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            violations: vec![Violation {
                instance_path: instance_path.into(),
                schema_path: String::new(),
                message: message.into(),
            }],
        }
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn into_inner(self) -> Vec<Violation> {
        self.violations
    }
}

impl fmt::Display for ValidationViolations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

/// Refuses every external reference.
struct NoRemoteRetriever;

impl Retrieve for NoRemoteRetriever {
    fn retrieve(
        &self,
        uri: &Uri<&str>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        Err(format!("external schema reference not allowed: {}", uri.as_str()).into())
    }
}

/// Compiled validators for every [`SchemaKind`].
///
/// `SchemaRegistry` is `Send + Sync`. Build one at startup and share it by
/// reference (or behind an `Arc` across tasks).
pub struct SchemaRegistry {
    validators: HashMap<SchemaKind, Validator>,
}

impl SchemaRegistry {
    /// Compile every embedded schema.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::BuildFailed`] naming the first schema that is
    /// not valid JSON or cannot be compiled.
    pub fn new() -> Result<Self, SchemaError> {
        let mut validators = HashMap::with_capacity(SchemaKind::ALL.len());
        for kind in SchemaKind::ALL {
            let schema: Value =
                serde_json::from_str(kind.source()).map_err(|e| SchemaError::BuildFailed {
                    kind,
                    reason: format!("invalid JSON: {e}"),
                })?;

            let mut opts = jsonschema::options();
            opts.with_draft(jsonschema::Draft::Draft202012);
            opts.with_retriever(NoRemoteRetriever);
            let validator = opts.build(&schema).map_err(|e| SchemaError::BuildFailed {
                kind,
                reason: e.to_string(),
            })?;
            validators.insert(kind, validator);
        }
        Ok(Self { validators })
    }

    /// Validate a JSON value against the schema for `kind`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::ValidationFailed`] listing every violation.
    pub fn validate(&self, kind: SchemaKind, instance: &Value) -> Result<(), SchemaError> {
        let validator = self
            .validators
            .get(&kind)
            .ok_or_else(|| SchemaError::BuildFailed {
                kind,
                reason: "schema not compiled".to_string(),
            })?;

        let violations: Vec<Violation> = validator
            .iter_errors(instance)
            .map(|e| Violation {
                instance_path: e.instance_path.to_string(),
                schema_path: e.schema_path.to_string(),
                message: e.to_string(),
            })
            .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(SchemaError::ValidationFailed {
                kind,
                violations: ValidationViolations { violations },
            })
        }
    }

    /// Number of compiled schemas.
    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }
}

impl fmt::Debug for SchemaRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut kinds: Vec<&str> = self.validators.keys().map(|k| k.as_str()).collect();
        kinds.sort_unstable();
        f.debug_struct("SchemaRegistry").field("kinds", &kinds).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn registry() -> SchemaRegistry {
        SchemaRegistry::new().expect("embedded schemas compile")
    }

    #[test]
    fn all_embedded_schemas_compile() {
        let reg = registry();
        assert_eq!(reg.len(), SchemaKind::ALL.len());
    }

    #[test]
    fn every_schema_id_matches_its_file_name() {
        for kind in SchemaKind::ALL {
            let schema: Value = serde_json::from_str(kind.source()).unwrap();
            let id = schema["$id"].as_str().unwrap();
            assert!(id.ends_with(kind.file_name()), "{id} vs {}", kind.file_name());
        }
    }

    #[test]
    fn offer_requires_single_price_of_at_least_one() {
        let reg = registry();
        let mut offer = json!({
            "url": "https://example.com/project",
            "sellerID": "902d1be5-9e5c-4d6a-8f0b-6a3bb8e7d5a1",
            "pricing": {"single": {"amount": 1000, "currency": "USD"}}
        });
        reg.validate(SchemaKind::Offer, &offer).unwrap();

        offer["pricing"]["single"]["amount"] = json!(0);
        let err = reg.validate(SchemaKind::Offer, &offer).unwrap_err();
        match err {
            SchemaError::ValidationFailed { kind, violations } => {
                assert_eq!(kind, SchemaKind::Offer);
                assert!(violations
                    .violations()
                    .iter()
                    .any(|v| v.instance_path == "/pricing/single/amount"));
            }
            other => panic!("expected ValidationFailed, got {other:?}"),
        }
    }

    #[test]
    fn seller_missing_field_reports_root_violation() {
        let reg = registry();
        let err = reg
            .validate(SchemaKind::Seller, &json!({"name": "Ann", "email": "ann@example.com"}))
            .unwrap_err();
        let text = err.to_string();
        assert!(text.contains("seller failed schema validation"));
        assert!(text.contains("(root)"));
    }

    #[test]
    fn register_rejects_non_hex_keys() {
        let reg = registry();
        let good = json!({
            "updated": "2019-01-01T00:00:00Z",
            "keys": {("ab".repeat(32)): {"from": "2018-01-01T00:00:00Z"}}
        });
        reg.validate(SchemaKind::Register, &good).unwrap();

        let bad = json!({
            "updated": "2019-01-01T00:00:00Z",
            "keys": {"not-a-key": {"from": "2018-01-01T00:00:00Z"}}
        });
        assert!(reg.validate(SchemaKind::Register, &bad).is_err());
    }

    #[test]
    fn receipt_rejects_additional_properties() {
        let reg = registry();
        let receipt = json!({
            "key": "aa",
            "signature": "bb",
            "license": {"form": "f", "values": {}},
            "extra": true
        });
        let err = reg.validate(SchemaKind::Receipt, &receipt).unwrap_err();
        assert_eq!(err.kind(), SchemaKind::Receipt);
    }

    #[test]
    fn violation_display_format() {
        let v = Violation {
            instance_path: "/pricing/single".to_string(),
            schema_path: "/properties/pricing".to_string(),
            message: "\"amount\" is a required property".to_string(),
        };
        assert_eq!(v.to_string(), "  /pricing/single: \"amount\" is a required property");
        let root = ValidationViolations::single("", "bad");
        assert_eq!(root.to_string(), "  (root): bad");
    }
}
