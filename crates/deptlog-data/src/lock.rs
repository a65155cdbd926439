//! Distributed lock manager
//!
//! Mutual exclusion over resource keys, built on the cache store's atomic
//! insert-if-absent and compare-and-delete primitives. Exclusion spans every
//! process sharing the cache backend; with the in-memory backend it is
//! process-local. Locks expire on their own after [`LockConfig::ttl`], so a
//! crashed holder can never wedge a resource.
//!
//! Acquisition is all-or-nothing across the requested keys: a partial
//! acquisition is rolled back before the next retry round, and a holder's
//! keys can only ever be removed with its own fencing token.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use rand::Rng;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{LockError, LockResult};
use crate::keys::Keyspace;
use crate::store::CacheStore;

/// Lock manager tunables.
#[derive(Debug, Clone)]
pub struct LockConfig {
    /// How long an acquired lock survives without release.
    pub ttl: Duration,
    /// Retry rounds after the initial attempt before reporting contention.
    pub retry_count: u32,
    /// Fixed delay between rounds.
    pub retry_delay: Duration,
    /// Upper bound of the random extra delay added per round.
    pub retry_jitter: Duration,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(60),
            retry_count: 10,
            retry_delay: Duration::from_millis(200),
            retry_jitter: Duration::from_millis(100),
        }
    }
}

impl LockConfig {
    /// Set the lock TTL.
    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Set the retry round count.
    #[must_use]
    pub fn with_retry_count(mut self, count: u32) -> Self {
        self.retry_count = count;
        self
    }

    /// Set the fixed delay between rounds.
    #[must_use]
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Set the jitter bound added to each delay.
    #[must_use]
    pub fn with_retry_jitter(mut self, jitter: Duration) -> Self {
        self.retry_jitter = jitter;
        self
    }
}

/// Held mutual exclusion over one or more resource keys.
///
/// The handle owns a fencing token; release only removes keys that still
/// hold that token, so an expired-and-reacquired lock is never clobbered.
#[derive(Debug)]
pub struct LockHandle {
    token: String,
    keys: Vec<String>,
}

impl LockHandle {
    /// The fencing token value stored under every held key.
    #[inline]
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Number of resource keys this handle holds.
    #[inline]
    #[must_use]
    pub fn key_count(&self) -> usize {
        self.keys.len()
    }
}

/// Acquires and releases resource locks through the shared cache.
pub struct LockManager {
    cache: Arc<dyn CacheStore>,
    keyspace: Keyspace,
    config: LockConfig,
}

impl LockManager {
    /// Manager over the given cache and keyspace.
    pub fn new(cache: Arc<dyn CacheStore>, keyspace: Keyspace, config: LockConfig) -> Self {
        Self {
            cache,
            keyspace,
            config,
        }
    }

    /// Acquire all of `resources`, or none of them.
    ///
    /// Retries the whole set for the configured budget, then reports
    /// [`LockError::Contended`] naming the blocking resource. Contention is
    /// an ordinary outcome ("another change is in progress"), not a fault;
    /// callers decide whether to retry, never this manager.
    ///
    /// # Errors
    /// [`LockError::Contended`] when a resource stays held through the retry
    /// budget; [`LockError::Store`] when the cache backend fails.
    pub async fn acquire(&self, resources: &[&str]) -> LockResult<LockHandle> {
        let token = Uuid::new_v4().to_string();
        let keys: Vec<String> = resources
            .iter()
            .map(|resource| self.keyspace.lock_key(resource))
            .collect();

        let mut rounds = 0;
        loop {
            match self.try_acquire_all(&keys, &token).await? {
                None => {
                    debug!(token = %token, held = keys.len(), "lock acquired");
                    return Ok(LockHandle { token, keys });
                }
                Some(busy) => {
                    if rounds >= self.config.retry_count {
                        warn!(resource = resources[busy], "lock contended, giving up");
                        return Err(LockError::contended(resources[busy]));
                    }
                    rounds += 1;
                    tokio::time::sleep(self.retry_backoff()).await;
                }
            }
        }
    }

    /// Release every key the handle still owns.
    ///
    /// Keys that expired or were reacquired by someone else are skipped
    /// silently; releasing an already-released handle is a no-op.
    ///
    /// # Errors
    /// [`LockError::Store`] when the cache backend fails.
    pub async fn release(&self, handle: LockHandle) -> LockResult<()> {
        let results = join_all(
            handle
                .keys
                .iter()
                .map(|key| self.cache.del_if_eq(key, &handle.token)),
        )
        .await;

        for result in results {
            result?;
        }
        debug!(token = %handle.token, "lock released");
        Ok(())
    }

    /// One acquisition round. `Ok(None)` means every key was taken;
    /// `Ok(Some(index))` names the first busy key after rolling back the
    /// ones already taken this round.
    async fn try_acquire_all(&self, keys: &[String], token: &str) -> LockResult<Option<usize>> {
        for (index, key) in keys.iter().enumerate() {
            let created = match self.cache.set_nx_ex(key, token, self.config.ttl).await {
                Ok(created) => created,
                Err(error) => {
                    self.rollback(&keys[..index], token).await;
                    return Err(error.into());
                }
            };
            if !created {
                self.rollback(&keys[..index], token).await;
                return Ok(Some(index));
            }
        }
        Ok(None)
    }

    /// Best-effort removal of partially acquired keys; anything left behind
    /// falls to the TTL.
    async fn rollback(&self, taken: &[String], token: &str) {
        let results = join_all(taken.iter().map(|key| self.cache.del_if_eq(key, token))).await;
        for (key, result) in taken.iter().zip(results) {
            if let Err(error) = result {
                warn!(key, %error, "partial lock rollback failed, TTL will reclaim");
            }
        }
    }

    fn retry_backoff(&self) -> Duration {
        let jitter_ms = u64::try_from(self.config.retry_jitter.as_millis()).unwrap_or(u64::MAX);
        let jitter = if jitter_ms == 0 {
            Duration::ZERO
        } else {
            Duration::from_millis(rand::rng().random_range(0..=jitter_ms))
        };
        self.config.retry_delay + jitter
    }
}
