//! Plain filesystem scan for `licensezero.json` files.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use lzero_schema::SchemaRegistry;

use super::{is_root, manifest_findings, package_json_meta, DiscoveryStrategy, MANIFEST_FILE};
use crate::error::DiscoveryError;
use crate::finding::Finding;

const SKIP_DIRS: &[&str] = &[".git", ".hg", ".svn"];

/// Walks the whole tree below the root. Symlinked directories are
/// followed through their canonical path, and every real directory is
/// visited at most once, so link cycles terminate and packages reachable
/// through several links are read once.
pub struct EmbeddedScan {
    registry: Arc<SchemaRegistry>,
}

impl EmbeddedScan {
    pub fn new(registry: Arc<SchemaRegistry>) -> Self {
        Self { registry }
    }
}

impl DiscoveryStrategy for EmbeddedScan {
    fn name(&self) -> &'static str {
        "embedded"
    }

    fn discover(&self, root: &Path) -> Result<Vec<Finding>, DiscoveryError> {
        let start = root
            .canonicalize()
            .map_err(|source| DiscoveryError::RootUnreadable {
                path: root.to_path_buf(),
                source,
            })?;

        let mut visited: HashSet<PathBuf> = HashSet::new();
        let mut pending = vec![start.clone()];
        let mut findings = Vec::new();

        while let Some(dir) = pending.pop() {
            if !visited.insert(dir.clone()) {
                continue;
            }

            let entries = match std::fs::read_dir(&dir) {
                Ok(entries) => entries,
                Err(source) if dir == start => {
                    return Err(DiscoveryError::RootUnreadable {
                        path: root.to_path_buf(),
                        source,
                    })
                }
                Err(e) => {
                    tracing::debug!(path = %dir.display(), error = %e, "skipping unreadable directory");
                    continue;
                }
            };

            let mut has_manifest = false;
            for entry in entries.flatten() {
                let name = entry.file_name();
                if name == MANIFEST_FILE {
                    has_manifest = true;
                    continue;
                }
                if SKIP_DIRS.iter().any(|skip| name == *skip) {
                    continue;
                }
                // Resolves symlinks; a dangling link fails here and is skipped.
                let Ok(real) = entry.path().canonicalize() else {
                    continue;
                };
                if real.is_dir() && !visited.contains(&real) {
                    pending.push(real);
                }
            }

            if has_manifest && !is_root(&start, &dir) {
                let package = package_json_meta(&dir);
                findings.extend(manifest_findings(&self.registry, self.name(), &dir, &package));
            }
        }

        tracing::debug!(strategy = self.name(), directories = visited.len(), findings = findings.len(), "scan complete");
        Ok(findings)
    }
}
