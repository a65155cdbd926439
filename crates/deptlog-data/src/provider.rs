//! Data provider
//!
//! The single entry point the rest of the service holds: it owns the two
//! backends, connects them once at startup, and hands out the guild store
//! and the lock manager built over them. Construct one provider, wrap it in
//! an `Arc`, and share that handle everywhere.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::time::timeout;
use tracing::{debug, info};

use crate::config::DataConfig;
use crate::error::{DataError, DataResult, StoreError, StoreResult};
use crate::guilds::GuildStore;
use crate::keys::Keyspace;
use crate::lock::LockManager;
use crate::report::{ErrorReporter, TracingReporter};
use crate::store::{CacheStore, DocumentStore};

/// Connected access to guild records and advisory locks.
pub struct DataProvider {
    documents: Arc<dyn DocumentStore>,
    cache: Arc<dyn CacheStore>,
    keyspace: Keyspace,
    guilds: GuildStore,
    locks: LockManager,
    config: DataConfig,
    connected: AtomicBool,
}

impl DataProvider {
    /// Build a provider over the given backends, reporting faults through
    /// the default tracing reporter.
    pub fn new(
        documents: Arc<dyn DocumentStore>,
        cache: Arc<dyn CacheStore>,
        config: DataConfig,
    ) -> Self {
        Self::with_reporter(documents, cache, config, Arc::new(TracingReporter))
    }

    /// Build a provider with a custom fault reporter.
    pub fn with_reporter(
        documents: Arc<dyn DocumentStore>,
        cache: Arc<dyn CacheStore>,
        config: DataConfig,
        reporter: Arc<dyn ErrorReporter>,
    ) -> Self {
        let keyspace = Keyspace::new(config.environment);
        let guilds = GuildStore::new(
            Arc::clone(&documents),
            Arc::clone(&cache),
            keyspace.clone(),
            Arc::clone(&reporter),
            config.cache_ttl,
        );
        let locks = LockManager::new(Arc::clone(&cache), keyspace.clone(), config.lock.clone());

        Self {
            documents,
            cache,
            keyspace,
            guilds,
            locks,
            config,
            connected: AtomicBool::new(false),
        }
    }

    /// Connect both backends, cache first, each under the configured
    /// timeout. Calling again after a successful connect is a no-op.
    ///
    /// # Errors
    /// `DataError::Connect` naming the backend that refused or timed out;
    /// a connect failure is fatal to startup and is not retried here.
    pub async fn connect(&self) -> DataResult<()> {
        if self.connected.load(Ordering::Acquire) {
            debug!("data provider already connected");
            return Ok(());
        }

        self.connect_backend("cache", self.cache.connect()).await?;
        self.connect_backend("documents", self.documents.connect())
            .await?;

        self.connected.store(true, Ordering::Release);
        info!(keyspace = self.keyspace.name(), "data provider connected");
        Ok(())
    }

    async fn connect_backend(
        &self,
        backend: &'static str,
        attempt: impl std::future::Future<Output = StoreResult<()>>,
    ) -> DataResult<()> {
        match timeout(self.config.connect_timeout, attempt).await {
            Ok(Ok(())) => {
                debug!(backend, "backend connected");
                Ok(())
            }
            Ok(Err(source)) => Err(DataError::connect(backend, source)),
            Err(_) => Err(DataError::connect(backend, StoreError::Timeout)),
        }
    }

    /// True once `connect()` has succeeded.
    #[inline]
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    /// Guild record reads and writes.
    #[inline]
    #[must_use]
    pub fn guilds(&self) -> &GuildStore {
        &self.guilds
    }

    /// Advisory locks over the cache backend.
    #[inline]
    #[must_use]
    pub fn locks(&self) -> &LockManager {
        &self.locks
    }

    /// The keyspace this provider addresses.
    #[inline]
    #[must_use]
    pub fn keyspace(&self) -> &Keyspace {
        &self.keyspace
    }

    /// The configuration this provider was built with.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &DataConfig {
        &self.config
    }
}
