//! # Discovery Strategies
//!
//! One strategy per packaging ecosystem, each answering the same question:
//! which `licensezero.json` offers are reachable from this project root?
//! The [`Locator`](crate::Locator) only knows the trait.

use std::path::Path;
use std::sync::Arc;

use lzero_schema::{decode_manifest, SchemaRegistry};

use crate::error::DiscoveryError;
use crate::finding::{Finding, PackageMeta};

mod bundler;
mod cargo;
mod embedded;
mod go;
mod npm;

pub use bundler::BundlerStrategy;
pub use cargo::CargoStrategy;
pub use embedded::EmbeddedScan;
pub use go::GoStrategy;
pub use npm::NpmStrategy;

/// File name of the embedded metadata file.
pub const MANIFEST_FILE: &str = "licensezero.json";

/// A way of finding offers in a project.
pub trait DiscoveryStrategy: Send + Sync {
    /// Short name, reported as [`Finding::ecosystem`].
    fn name(&self) -> &'static str;

    /// Every finding reachable from `root`.
    ///
    /// # Errors
    ///
    /// Any error means "this strategy found nothing"; the locator logs it
    /// and moves on.
    fn discover(&self, root: &Path) -> Result<Vec<Finding>, DiscoveryError>;
}

/// Read the `licensezero.json` in `dir`, if there is one, into findings.
///
/// Missing files yield nothing. Unreadable or invalid files, and unusable
/// entries within a valid file, are logged and skipped: one broken package
/// must not hide the others.
pub(crate) fn manifest_findings(
    registry: &Arc<SchemaRegistry>,
    ecosystem: &'static str,
    dir: &Path,
    package: &PackageMeta,
) -> Vec<Finding> {
    let path = dir.join(MANIFEST_FILE);
    let bytes = match std::fs::read(&path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
        Err(e) => {
            tracing::warn!(strategy = ecosystem, path = %path.display(), error = %e, "cannot read licensezero.json");
            return Vec::new();
        }
    };

    let manifest = match decode_manifest(registry, &bytes) {
        Ok(manifest) => manifest,
        Err(e) => {
            tracing::warn!(strategy = ecosystem, path = %path.display(), error = %e, "invalid licensezero.json");
            return Vec::new();
        }
    };

    for skipped in &manifest.skipped {
        tracing::warn!(
            strategy = ecosystem,
            path = %path.display(),
            index = skipped.index,
            reason = %skipped.reason,
            "skipping licensezero.json entry"
        );
    }

    manifest
        .offers
        .into_iter()
        .map(|offer| Finding {
            ecosystem,
            path: dir.to_path_buf(),
            package: package.clone(),
            broker: offer.server,
            offer_id: offer.offer_id,
            public: offer.public,
        })
        .collect()
}

/// Read `name` and `version` from an npm-style `package.json` in `dir`.
pub(crate) fn package_json_meta(dir: &Path) -> PackageMeta {
    #[derive(serde::Deserialize)]
    struct PackageJson {
        name: Option<String>,
        version: Option<String>,
    }

    std::fs::read(dir.join("package.json"))
        .ok()
        .and_then(|bytes| serde_json::from_slice::<PackageJson>(&bytes).ok())
        .map(|pkg| PackageMeta::npm(pkg.name.as_deref(), pkg.version.as_deref()))
        .unwrap_or_default()
}

/// True when `dir` is the project root itself. A project is not its own
/// dependency.
pub(crate) fn is_root(root: &Path, dir: &Path) -> bool {
    match (root.canonicalize(), dir.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => root == dir,
    }
}
