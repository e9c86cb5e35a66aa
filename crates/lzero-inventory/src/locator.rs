//! # Artifact Locator
//!
//! Runs every discovery strategy against the project root and merges the
//! results. Strategies are a priority list: when two report the same
//! `(broker, offerID)`, the earlier one's finding is kept.

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use lzero_schema::SchemaRegistry;

use crate::command::CommandRunner;
use crate::error::DiscoveryError;
use crate::finding::Finding;
use crate::strategy::{
    BundlerStrategy, CargoStrategy, DiscoveryStrategy, EmbeddedScan, GoStrategy, NpmStrategy,
};

pub struct Locator {
    strategies: Vec<Box<dyn DiscoveryStrategy>>,
}

impl Locator {
    pub fn new(strategies: Vec<Box<dyn DiscoveryStrategy>>) -> Self {
        Self { strategies }
    }

    /// The built-in strategies. Ecosystem listings come before the plain
    /// file scan because they carry package names and versions.
    pub fn standard(registry: Arc<SchemaRegistry>, runner: Arc<dyn CommandRunner>) -> Self {
        Self::new(vec![
            Box::new(NpmStrategy::new(Arc::clone(&registry), Arc::clone(&runner))),
            Box::new(CargoStrategy::new(Arc::clone(&registry), Arc::clone(&runner))),
            Box::new(GoStrategy::new(Arc::clone(&registry), Arc::clone(&runner))),
            Box::new(BundlerStrategy::new(Arc::clone(&registry), runner)),
            Box::new(EmbeddedScan::new(registry)),
        ])
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Every distinct finding reachable from `root`.
    ///
    /// # Errors
    ///
    /// Only when `root` itself cannot be read. A failing strategy is logged
    /// and contributes nothing.
    pub fn locate(&self, root: &Path) -> Result<Vec<Finding>, DiscoveryError> {
        std::fs::read_dir(root).map_err(|source| DiscoveryError::RootUnreadable {
            path: root.to_path_buf(),
            source,
        })?;

        let mut seen = HashSet::new();
        let mut merged = Vec::new();
        for strategy in &self.strategies {
            let found = match strategy.discover(root) {
                Ok(found) => found,
                Err(DiscoveryError::RootUnreadable { path, source }) => {
                    return Err(DiscoveryError::RootUnreadable { path, source })
                }
                Err(e) => {
                    tracing::info!(strategy = strategy.name(), error = %e, "discovery strategy skipped");
                    continue;
                }
            };
            let before = merged.len();
            for finding in found {
                if seen.insert(finding.key()) {
                    merged.push(finding);
                }
            }
            tracing::debug!(strategy = strategy.name(), added = merged.len() - before, "strategy finished");
        }
        Ok(merged)
    }
}
