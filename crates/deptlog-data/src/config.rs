//! Data-layer configuration

use std::time::Duration;

use crate::keys::Environment;
use crate::lock::LockConfig;

/// Tunables for the whole data layer.
///
/// Defaults match the production deployment; tests shrink the timing knobs.
#[derive(Debug, Clone)]
pub struct DataConfig {
    /// Deployment environment selecting the keyspace.
    pub environment: Environment,
    /// Per-backend deadline for connection establishment.
    pub connect_timeout: Duration,
    /// Expiry on cached guild records.
    pub cache_ttl: Duration,
    /// Lock manager tunables.
    pub lock: LockConfig,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            environment: Environment::Production,
            connect_timeout: Duration::from_secs(20),
            cache_ttl: Duration::from_secs(3600),
            lock: LockConfig::default(),
        }
    }
}

impl DataConfig {
    /// Production defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Select the deployment environment.
    #[must_use]
    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Set the per-backend connect deadline.
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the cached-record expiry.
    #[must_use]
    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Set the lock manager tunables.
    #[must_use]
    pub fn with_lock(mut self, lock: LockConfig) -> Self {
        self.lock = lock;
        self
    }
}
