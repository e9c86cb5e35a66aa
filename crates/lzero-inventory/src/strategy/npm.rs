//! npm: `npm ls --parseable --all` lists every installed package directory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use lzero_schema::SchemaRegistry;

use super::{is_root, manifest_findings, package_json_meta, DiscoveryStrategy};
use crate::command::CommandRunner;
use crate::error::DiscoveryError;
use crate::finding::Finding;

pub struct NpmStrategy {
    registry: Arc<SchemaRegistry>,
    runner: Arc<dyn CommandRunner>,
}

impl NpmStrategy {
    pub fn new(registry: Arc<SchemaRegistry>, runner: Arc<dyn CommandRunner>) -> Self {
        Self { registry, runner }
    }
}

impl DiscoveryStrategy for NpmStrategy {
    fn name(&self) -> &'static str {
        "npm"
    }

    fn discover(&self, root: &Path) -> Result<Vec<Finding>, DiscoveryError> {
        if !root.join("package.json").is_file() {
            return Ok(Vec::new());
        }
        let output = self
            .runner
            .run("npm", &["ls", "--parseable", "--all"], root)?;

        let mut findings = Vec::new();
        for line in output.lines().map(str::trim).filter(|l| !l.is_empty()) {
            let dir = PathBuf::from(line);
            if is_root(root, &dir) {
                continue;
            }
            let package = package_json_meta(&dir);
            findings.extend(manifest_findings(&self.registry, self.name(), &dir, &package));
        }
        Ok(findings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::test_support::{registry, write_manifest, StubRunner, OFFER_A};

    #[test]
    fn reads_listed_package_directories() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("package.json"), r#"{"name": "app"}"#).unwrap();
        let pkg = dir.path().join("node_modules/demo");
        write_manifest(&pkg, OFFER_A, "Parity-7.0.0");
        std::fs::write(pkg.join("package.json"), r#"{"name": "demo", "version": "2.0.0"}"#).unwrap();
        let plain = dir.path().join("node_modules/plain");
        std::fs::create_dir_all(&plain).unwrap();

        let listing = format!(
            "{}\n{}\n{}\n",
            dir.path().display(),
            pkg.display(),
            plain.display()
        );
        let runner = Arc::new(StubRunner::with("npm", listing));
        let findings = NpmStrategy::new(registry(), runner).discover(dir.path()).unwrap();

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].ecosystem, "npm");
        assert_eq!(findings[0].package.name.as_deref(), Some("demo"));
        assert_eq!(findings[0].package.version.as_deref(), Some("2.0.0"));
    }

    #[test]
    fn not_an_npm_project() {
        let dir = tempfile::tempdir().unwrap();
        let runner = Arc::new(StubRunner::default());
        let findings = NpmStrategy::new(registry(), runner).discover(dir.path()).unwrap();
        assert!(findings.is_empty());
    }

    #[test]
    fn missing_npm_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("package.json"), "{}").unwrap();
        let runner = Arc::new(StubRunner::default());
        let err = NpmStrategy::new(registry(), runner).discover(dir.path()).unwrap_err();
        assert!(matches!(err, DiscoveryError::Command { .. }));
    }
}
