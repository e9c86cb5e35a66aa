//! Everything a command needs for one run: where the project and the
//! identity store are, and the shared broker plumbing.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use lzero_broker::{BrokerConfig, BrokerPool, ResolutionCache};
use lzero_inventory::{
    Classifier, IdentityStore, Inventory, Locator, Policy, StoreConfig, SystemCommandRunner,
};
use lzero_schema::SchemaRegistry;

pub struct Session {
    /// Project root to scan.
    pub root: PathBuf,
    pub store: StoreConfig,
    pub registry: Arc<SchemaRegistry>,
    pub pool: Arc<BrokerPool>,
    /// Shared by every lookup in this run.
    pub cache: Arc<ResolutionCache>,
}

impl Session {
    /// Build the schema registry and broker pool. Fails when a schema does
    /// not compile or the HTTP client cannot be created.
    pub fn open(root: PathBuf, store: StoreConfig, broker: &BrokerConfig) -> Result<Self> {
        let registry = Arc::new(SchemaRegistry::new().context("failed to compile schemas")?);
        let pool = Arc::new(
            BrokerPool::new(broker, Arc::clone(&registry))
                .context("failed to create HTTP client")?,
        );
        Ok(Self {
            root,
            store,
            registry,
            pool,
            cache: Arc::new(ResolutionCache::new()),
        })
    }

    pub fn load_store(&self) -> Result<IdentityStore> {
        IdentityStore::load(&self.store, &self.registry).with_context(|| {
            format!("failed to load identity store from {}", self.store.dir.display())
        })
    }

    /// Locate, resolve and classify the project's dependencies.
    pub async fn inventory(&self, policy: Policy) -> Result<Inventory> {
        let store = Arc::new(self.load_store()?);

        let locator = Locator::standard(
            Arc::clone(&self.registry),
            Arc::new(SystemCommandRunner::default()),
        );
        let root = self.root.clone();
        // Discovery blocks on the filesystem and on listing tools.
        let findings = tokio::task::spawn_blocking(move || locator.locate(&root))
            .await
            .context("discovery task failed")?
            .with_context(|| format!("failed to scan {}", self.root.display()))?;
        tracing::info!(findings = findings.len(), root = %self.root.display(), "discovery complete");

        let classifier = Classifier::new(
            Arc::clone(&self.pool),
            Arc::clone(&self.cache),
            store,
            policy,
        );
        Ok(classifier.classify(findings).await)
    }
}
