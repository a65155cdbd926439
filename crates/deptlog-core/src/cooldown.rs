//! Command cooldown tracking
//!
//! Per-user, per-action cooldown deadlines in a capacity-bounded concurrent
//! cache. The tracker is an injected value, not module state: construct one
//! at startup and hand it to whatever dispatches commands. Entries are
//! process-local; every process enforces its own cooldowns.

use std::time::{Duration, Instant};

use moka::future::Cache;

/// Default maximum number of live cooldown entries.
const DEFAULT_CAPACITY: u64 = 10_000;

/// Entries are evicted this long after creation regardless of deadline;
/// cooldown periods longer than this are cut short by eviction.
const EVICTION_HORIZON: Duration = Duration::from_secs(3600);

/// Outcome of starting a cooldown-guarded action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cooldown {
    /// The action may run; its cooldown period has started.
    Ready,
    /// The action ran recently; retry after the remaining time.
    Active {
        /// Time left until the action is allowed again.
        remaining: Duration,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CooldownKey {
    user: String,
    action: String,
}

impl CooldownKey {
    fn new(user: &str, action: &str) -> Self {
        Self {
            user: user.to_owned(),
            action: action.to_owned(),
        }
    }
}

/// Tracks cooldown deadlines keyed by user and action.
#[derive(Debug, Clone)]
pub struct CooldownTracker {
    inner: Cache<CooldownKey, Instant>,
}

impl CooldownTracker {
    /// Tracker bounded to `max_capacity` live entries.
    #[must_use]
    pub fn new(max_capacity: u64) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(max_capacity)
                .time_to_live(EVICTION_HORIZON)
                .build(),
        }
    }

    /// Start the action's cooldown, or report the active one.
    ///
    /// Returns [`Cooldown::Ready`] and arms a fresh deadline when no live
    /// cooldown exists; otherwise returns the remaining time untouched.
    pub async fn begin(&self, user: &str, action: &str, period: Duration) -> Cooldown {
        let key = CooldownKey::new(user, action);
        let now = Instant::now();

        if let Some(deadline) = self.inner.get(&key).await {
            if deadline > now {
                return Cooldown::Active {
                    remaining: deadline - now,
                };
            }
        }

        self.inner.insert(key, now + period).await;
        Cooldown::Ready
    }

    /// Remaining time of a live cooldown, if any.
    pub async fn remaining(&self, user: &str, action: &str) -> Option<Duration> {
        let deadline = self.inner.get(&CooldownKey::new(user, action)).await?;
        let now = Instant::now();
        (deadline > now).then(|| deadline - now)
    }

    /// Drop the action's cooldown early.
    pub async fn clear(&self, user: &str, action: &str) {
        self.inner.invalidate(&CooldownKey::new(user, action)).await;
    }

    /// Approximate number of tracked entries.
    #[inline]
    #[must_use]
    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }
}

impl Default for CooldownTracker {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
