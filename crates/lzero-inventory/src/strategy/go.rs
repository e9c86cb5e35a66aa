//! Go modules: `go list -m -json all` prints one JSON object per module.

use std::path::Path;
use std::sync::Arc;

use lzero_schema::SchemaRegistry;
use serde::Deserialize;

use super::{is_root, manifest_findings, DiscoveryStrategy};
use crate::command::CommandRunner;
use crate::error::DiscoveryError;
use crate::finding::{Finding, PackageMeta};

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Module {
    path: String,
    version: Option<String>,
    /// Absent for modules that are not downloaded.
    dir: Option<String>,
}

pub struct GoStrategy {
    registry: Arc<SchemaRegistry>,
    runner: Arc<dyn CommandRunner>,
}

impl GoStrategy {
    pub fn new(registry: Arc<SchemaRegistry>, runner: Arc<dyn CommandRunner>) -> Self {
        Self { registry, runner }
    }
}

impl DiscoveryStrategy for GoStrategy {
    fn name(&self) -> &'static str {
        "go"
    }

    fn discover(&self, root: &Path) -> Result<Vec<Finding>, DiscoveryError> {
        if !root.join("go.mod").is_file() {
            return Ok(Vec::new());
        }
        let output = self.runner.run("go", &["list", "-m", "-json", "all"], root)?;

        let mut findings = Vec::new();
        // Concatenated objects, not an array.
        for module in serde_json::Deserializer::from_str(&output).into_iter::<Module>() {
            let module = module.map_err(|e| DiscoveryError::Parse {
                program: "go".into(),
                reason: e.to_string(),
            })?;
            let Some(dir) = module.dir.as_deref().map(Path::new) else {
                continue;
            };
            if is_root(root, dir) {
                continue;
            }
            let meta = PackageMeta {
                scope: None,
                name: Some(module.path),
                version: module.version,
            };
            findings.extend(manifest_findings(&self.registry, self.name(), dir, &meta));
        }
        Ok(findings)
    }
}
