//! Bundler: `bundle show --paths` prints one installed gem directory per
//! line.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use lzero_schema::SchemaRegistry;

use super::{manifest_findings, DiscoveryStrategy};
use crate::command::CommandRunner;
use crate::error::DiscoveryError;
use crate::finding::{Finding, PackageMeta};

pub struct BundlerStrategy {
    registry: Arc<SchemaRegistry>,
    runner: Arc<dyn CommandRunner>,
}

impl BundlerStrategy {
    pub fn new(registry: Arc<SchemaRegistry>, runner: Arc<dyn CommandRunner>) -> Self {
        Self { registry, runner }
    }
}

impl DiscoveryStrategy for BundlerStrategy {
    fn name(&self) -> &'static str {
        "bundler"
    }

    fn discover(&self, root: &Path) -> Result<Vec<Finding>, DiscoveryError> {
        if !root.join("Gemfile").is_file() {
            return Ok(Vec::new());
        }
        let output = self.runner.run("bundle", &["show", "--paths"], root)?;

        let mut findings = Vec::new();
        for line in output.lines().map(str::trim).filter(|l| !l.is_empty()) {
            let dir = PathBuf::from(line);
            let meta = dir
                .file_name()
                .and_then(|n| n.to_str())
                .map(gem_meta)
                .unwrap_or_default();
            findings.extend(manifest_findings(&self.registry, self.name(), &dir, &meta));
        }
        Ok(findings)
    }
}

/// Split `name-version` at the first `-` followed by a digit. Gem names
/// may contain dashes; versions start with a digit.
fn gem_meta(dir_name: &str) -> PackageMeta {
    let split = dir_name
        .char_indices()
        .find(|&(i, c)| {
            c == '-'
                && dir_name[i + 1..]
                    .chars()
                    .next()
                    .is_some_and(|next| next.is_ascii_digit())
        })
        .map(|(i, _)| i);
    match split {
        Some(i) => PackageMeta {
            scope: None,
            name: Some(dir_name[..i].to_string()),
            version: Some(dir_name[i + 1..].to_string()),
        },
        None => PackageMeta {
            scope: None,
            name: Some(dir_name.to_string()),
            version: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::test_support::{registry, write_manifest, StubRunner, OFFER_A};

    #[test]
    fn gem_directory_names() {
        let meta = gem_meta("rack-test-2.1.0");
        assert_eq!(meta.name.as_deref(), Some("rack-test"));
        assert_eq!(meta.version.as_deref(), Some("2.1.0"));

        let bare = gem_meta("vendored");
        assert_eq!(bare.name.as_deref(), Some("vendored"));
        assert_eq!(bare.version, None);
    }

    #[test]
    fn reads_gem_directories() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Gemfile"), "source 'https://rubygems.org'\n").unwrap();
        let gem = dir.path().join("gems/licensed-gem-0.4.0");
        write_manifest(&gem, OFFER_A, "Parity-7.0.0");

        let runner = Arc::new(StubRunner::with("bundle", format!("{}\n", gem.display())));
        let findings = BundlerStrategy::new(registry(), runner).discover(dir.path()).unwrap();

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].label(), "licensed-gem@0.4.0");
    }
}
