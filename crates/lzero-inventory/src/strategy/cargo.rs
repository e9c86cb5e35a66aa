//! Cargo: `cargo metadata` lists every package with its manifest path.

use std::path::Path;
use std::sync::Arc;

use lzero_schema::SchemaRegistry;
use serde::Deserialize;

use super::{is_root, manifest_findings, DiscoveryStrategy};
use crate::command::CommandRunner;
use crate::error::DiscoveryError;
use crate::finding::{Finding, PackageMeta};

#[derive(Deserialize)]
struct Metadata {
    packages: Vec<Package>,
}

#[derive(Deserialize)]
struct Package {
    name: String,
    version: String,
    manifest_path: String,
}

pub struct CargoStrategy {
    registry: Arc<SchemaRegistry>,
    runner: Arc<dyn CommandRunner>,
}

impl CargoStrategy {
    pub fn new(registry: Arc<SchemaRegistry>, runner: Arc<dyn CommandRunner>) -> Self {
        Self { registry, runner }
    }
}

impl DiscoveryStrategy for CargoStrategy {
    fn name(&self) -> &'static str {
        "cargo"
    }

    fn discover(&self, root: &Path) -> Result<Vec<Finding>, DiscoveryError> {
        if !root.join("Cargo.toml").is_file() {
            return Ok(Vec::new());
        }
        let output = self
            .runner
            .run("cargo", &["metadata", "--format-version", "1"], root)?;
        let metadata: Metadata =
            serde_json::from_str(&output).map_err(|e| DiscoveryError::Parse {
                program: "cargo".into(),
                reason: e.to_string(),
            })?;

        let mut findings = Vec::new();
        for package in metadata.packages {
            let Some(dir) = Path::new(&package.manifest_path).parent() else {
                continue;
            };
            if is_root(root, dir) {
                continue;
            }
            let meta = PackageMeta {
                scope: None,
                name: Some(package.name),
                version: Some(package.version),
            };
            findings.extend(manifest_findings(&self.registry, self.name(), dir, &meta));
        }
        Ok(findings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::test_support::{registry, write_manifest, StubRunner, OFFER_A};

    #[test]
    fn reads_manifest_next_to_each_package() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Cargo.toml"), "[package]\nname = \"app\"\n").unwrap();
        let dep = dir.path().join("registry/demo-0.3.1");
        write_manifest(&dep, OFFER_A, "Parity-7.0.0");

        let output = serde_json::json!({
            "packages": [
                {"name": "app", "version": "0.1.0", "manifest_path": dir.path().join("Cargo.toml")},
                {"name": "demo", "version": "0.3.1", "manifest_path": dep.join("Cargo.toml")}
            ],
            "workspace_members": []
        })
        .to_string();
        let runner = Arc::new(StubRunner::with("cargo", output));
        let findings = CargoStrategy::new(registry(), runner).discover(dir.path()).unwrap();

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].label(), "demo@0.3.1");
        assert_eq!(findings[0].path, dep);
    }

    #[test]
    fn garbage_output_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Cargo.toml"), "").unwrap();
        let runner = Arc::new(StubRunner::with("cargo", "error: could not find Cargo.toml"));
        let err = CargoStrategy::new(registry(), runner).discover(dir.path()).unwrap_err();
        assert!(matches!(err, DiscoveryError::Parse { .. }));
    }
}
