//! # Identity Store
//!
//! The user's saved receipts and seller accounts:
//!
//! ```text
//! <dir>/receipts/*.json   one receipt per file
//! <dir>/accounts/*.json   one account per file
//! ```
//!
//! Missing directories mean no records. Anything present but unreadable
//! or invalid fails the whole load: classifying against a partial store
//! would report licensed dependencies as unlicensed.

use std::path::{Path, PathBuf};

use lzero_core::{Account, BrokerUrl, OfferId, Receipt, SellerId};
use lzero_schema::{decode_account, decode_receipt, DecodeError, SchemaRegistry};

use crate::error::StoreError;

/// Environment variable overriding the store directory.
pub const CONFIG_ENV: &str = "LICENSEZERO_CONFIG";

/// Where the identity store lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub dir: PathBuf,
}

impl StoreConfig {
    /// Resolve the directory: an explicit path wins, then
    /// `LICENSEZERO_CONFIG`, then `$HOME/.config/licensezero`.
    pub fn resolve(explicit: Option<PathBuf>) -> Result<Self, StoreError> {
        Self::resolve_with(explicit, |var| std::env::var_os(var).map(PathBuf::from))
    }

    fn resolve_with(
        explicit: Option<PathBuf>,
        env: impl Fn(&str) -> Option<PathBuf>,
    ) -> Result<Self, StoreError> {
        let dir = explicit
            .or_else(|| env(CONFIG_ENV))
            .or_else(|| env("HOME").map(|home| home.join(".config").join("licensezero")))
            .ok_or(StoreError::NoDirectory)?;
        Ok(Self { dir })
    }

    pub fn receipts_dir(&self) -> PathBuf {
        self.dir.join("receipts")
    }

    pub fn accounts_dir(&self) -> PathBuf {
        self.dir.join("accounts")
    }
}

/// A receipt and the file it was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredReceipt {
    pub path: PathBuf,
    pub receipt: Receipt,
}

#[derive(Debug, Clone, Default)]
pub struct IdentityStore {
    pub receipts: Vec<StoredReceipt>,
    pub accounts: Vec<Account>,
}

impl IdentityStore {
    /// Read every receipt and account under `config.dir`.
    ///
    /// Receipts are decoded against the receipt schema only; signatures
    /// are checked when they are used.
    pub fn load(config: &StoreConfig, registry: &SchemaRegistry) -> Result<Self, StoreError> {
        let receipts = read_records(&config.receipts_dir(), registry, decode_receipt)?
            .into_iter()
            .map(|(path, receipt)| StoredReceipt { path, receipt })
            .collect::<Vec<_>>();
        let accounts = read_records(&config.accounts_dir(), registry, decode_account)?
            .into_iter()
            .map(|(_, account)| account)
            .collect::<Vec<_>>();

        tracing::debug!(
            dir = %config.dir.display(),
            receipts = receipts.len(),
            accounts = accounts.len(),
            "identity store loaded"
        );
        Ok(Self { receipts, accounts })
    }

    /// Stored receipts for an offer on a broker. A receipt whose `api` is
    /// not a valid broker URL matches nothing.
    pub fn receipts_for<'a>(
        &'a self,
        broker: &'a BrokerUrl,
        offer_id: &'a OfferId,
    ) -> impl Iterator<Item = &'a StoredReceipt> + 'a {
        self.receipts.iter().filter(move |stored| {
            &stored.receipt.offer_id() == offer_id
                && stored.receipt.broker_url().is_ok_and(|api| &api == broker)
        })
    }

    /// True when the user holds an account for this seller on this broker.
    pub fn owns(&self, broker: &BrokerUrl, seller_id: &SellerId) -> bool {
        self.accounts.iter().any(|a| a.is_seller(broker, seller_id))
    }

    /// Overwrite a stored receipt file with `receipt` in canonical form.
    ///
    /// Writes a sibling temporary file and renames it over the original, so
    /// a crash never leaves a truncated receipt behind.
    pub fn replace_receipt(path: &Path, receipt: &Receipt) -> Result<(), StoreError> {
        let bytes = receipt.canonical().map_err(|e| StoreError::Serialize {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "receipt.json".to_string());
        let tmp = path.with_file_name(format!(".{file_name}.tmp"));

        std::fs::write(&tmp, bytes.as_bytes()).map_err(|source| StoreError::Write {
            path: tmp.clone(),
            source,
        })?;
        std::fs::rename(&tmp, path).map_err(|source| {
            let _ = std::fs::remove_file(&tmp);
            StoreError::Write {
                path: path.to_path_buf(),
                source,
            }
        })?;
        tracing::info!(path = %path.display(), "receipt replaced");
        Ok(())
    }
}

/// Decode every `*.json` file in `dir`, sorted by path.
fn read_records<T>(
    dir: &Path,
    registry: &SchemaRegistry,
    decode: fn(&SchemaRegistry, &[u8]) -> Result<T, DecodeError>,
) -> Result<Vec<(PathBuf, T)>, StoreError> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(StoreError::Io {
                path: dir.to_path_buf(),
                source,
            })
        }
    };

    let mut paths = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| StoreError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        let is_json = path.extension().is_some_and(|ext| ext == "json");
        let hidden = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with('.'));
        if is_json && !hidden && path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();

    paths
        .into_iter()
        .map(|path| {
            let bytes = std::fs::read(&path).map_err(|source| StoreError::Io {
                path: path.clone(),
                source,
            })?;
            let record = decode(registry, &bytes).map_err(|source| StoreError::Invalid {
                path: path.clone(),
                source,
            })?;
            Ok((path, record))
        })
        .collect()
}
