//! Discovery and identity store errors.

use std::path::PathBuf;

use lzero_schema::DecodeError;
use thiserror::Error;

/// A discovery strategy, or the locator itself, failed.
#[derive(Error, Debug)]
pub enum DiscoveryError {
    /// The project root could not be read. Fatal for the run.
    #[error("cannot read project directory {}: {source}", path.display())]
    RootUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An external listing tool is missing or failed.
    #[error("`{program}` failed: {reason}")]
    Command { program: String, reason: String },

    /// A listing tool's output could not be understood.
    #[error("cannot parse `{program}` output: {reason}")]
    Parse { program: String, reason: String },
}

/// The local identity store could not be read. Fatal for the run.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid {}: {source}", path.display())]
    Invalid {
        path: PathBuf,
        #[source]
        source: DecodeError,
    },

    #[error("cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot serialize receipt for {}: {reason}", path.display())]
    Serialize { path: PathBuf, reason: String },

    #[error("no identity store directory: pass --config-dir or set LICENSEZERO_CONFIG or HOME")]
    NoDirectory,
}
