//! Broker client configuration.
//!
//! Defaults suit interactive use. Override via environment variables or
//! explicit construction for tests.

use std::time::Duration;

/// Configuration shared by every broker connection in a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerConfig {
    /// Per-request timeout in seconds, covering connect through body read.
    pub timeout_secs: u64,
    /// Concurrent requests allowed against any one broker host.
    pub max_connections_per_host: usize,
    /// `User-Agent` header sent with every request.
    pub user_agent: String,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_connections_per_host: 4,
            user_agent: default_user_agent(),
        }
    }
}

impl BrokerConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `LICENSEZERO_TIMEOUT_SECS` (default: 30)
    /// - `LICENSEZERO_MAX_CONNECTIONS_PER_HOST` (default: 4)
    /// - `LICENSEZERO_USER_AGENT` (default: `licensezero-cli/<version>`)
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for a set but unparseable or
    /// zero numeric variable.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            timeout_secs: env_positive("LICENSEZERO_TIMEOUT_SECS", defaults.timeout_secs)?,
            max_connections_per_host: env_positive(
                "LICENSEZERO_MAX_CONNECTIONS_PER_HOST",
                defaults.max_connections_per_host,
            )?,
            user_agent: std::env::var("LICENSEZERO_USER_AGENT")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(defaults.user_agent),
        })
    }

    /// Short timeouts for tests against a local mock broker.
    pub fn local_mock() -> Self {
        Self {
            timeout_secs: 5,
            ..Self::default()
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_user_agent() -> String {
    format!("licensezero-cli/{}", env!("CARGO_PKG_VERSION"))
}

fn env_positive<T>(var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr + PartialEq + From<u8>,
{
    match std::env::var(var) {
        Err(_) => Ok(default),
        Ok(raw) => match raw.trim().parse::<T>() {
            Ok(v) if v != T::from(0) => Ok(v),
            _ => Err(ConfigError::InvalidValue { var, value: raw }),
        },
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be a positive integer, got \"{value}\"")]
    InvalidValue { var: &'static str, value: String },
}
