//! Broker client errors.

use lzero_schema::{DecodeError, SchemaError, SchemaKind, ValidationViolations};

/// Error talking to a broker.
///
/// The variants fall into two families. [`is_transport`](Self::is_transport)
/// covers "could not get an answer" and is worth retrying later.
/// [`is_schema`](Self::is_schema) covers "got an answer that cannot be
/// trusted" and is not.
#[derive(Debug, thiserror::Error)]
pub enum BrokerError {
    /// Connection failure, timeout or interrupted body.
    #[error("cannot reach {endpoint}: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    /// Non-success status, other than a 404 on the optional reseller record.
    #[error("{endpoint} returned HTTP {status}")]
    Status { endpoint: String, status: u16 },

    /// The body is not JSON.
    #[error("{endpoint} returned a body that is not JSON: {source}")]
    InvalidJson {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },

    /// The body is JSON but not a valid record of the expected kind.
    #[error("{endpoint} returned an invalid {kind}:\n{violations}")]
    Schema {
        kind: SchemaKind,
        endpoint: String,
        violations: ValidationViolations,
    },

    /// The request could not be built (bad path or body).
    #[error("cannot build request for {endpoint}: {reason}")]
    Request { endpoint: String, reason: String },

    /// The run was shut down before a connection slot freed up.
    #[error("request to {endpoint} cancelled")]
    Cancelled { endpoint: String },

    /// The HTTP client could not be constructed.
    #[error("cannot initialize HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl BrokerError {
    /// The broker could not be reached or did not answer successfully.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Transport { .. } | Self::Status { .. } | Self::Cancelled { .. }
        )
    }

    /// The broker answered with something that failed validation.
    pub fn is_schema(&self) -> bool {
        matches!(self, Self::InvalidJson { .. } | Self::Schema { .. })
    }

    pub(crate) fn from_decode(endpoint: String, err: DecodeError) -> Self {
        match err {
            DecodeError::Syntax { source, .. } => Self::InvalidJson { endpoint, source },
            DecodeError::Schema(SchemaError::ValidationFailed { kind, violations }) => {
                Self::Schema {
                    kind,
                    endpoint,
                    violations,
                }
            }
            DecodeError::Schema(SchemaError::BuildFailed { kind, reason }) => Self::Schema {
                kind,
                endpoint,
                violations: ValidationViolations::single("", reason),
            },
        }
    }
}
