//! Guarded configuration mutations
//!
//! Every configuration change goes through [`ConfigService::mutate`]: fetch
//! the current record, take the guild's config lock, apply the change,
//! dual-write, release. A contended lock aborts the whole change with
//! [`MutationError::Busy`] rather than queueing, and the caller always gets
//! the record as it stood before the change for auditing.

use std::sync::Arc;

use tracing::{debug, warn};

use deptlog_data::{DataError, DataProvider, Keyspace, LockError};
use deptlog_record::{ContactMethod, GuildId, GuildRecord};

/// Outcome of a persisted mutation: the new record and the one it replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mutation {
    /// The record as it stood before the change.
    pub previous: GuildRecord,
    /// The record that was persisted.
    pub record: GuildRecord,
}

/// Why a guarded mutation did not persist.
#[derive(Debug, thiserror::Error)]
pub enum MutationError {
    /// Another configuration change for this guild is already in progress.
    #[error("configuration busy: {resource} is being changed elsewhere, retry shortly")]
    Busy {
        /// The contended lock resource.
        resource: String,
    },

    /// The data layer failed underneath the mutation.
    #[error(transparent)]
    Data(#[from] DataError),
}

impl MutationError {
    /// True for the expected another-change-in-progress outcome.
    #[inline]
    #[must_use]
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Busy { .. })
    }
}

impl From<LockError> for MutationError {
    fn from(error: LockError) -> Self {
        match error {
            LockError::Contended { resource } => Self::Busy { resource },
            LockError::Store(store) => Self::Data(DataError::Store(store)),
        }
    }
}

/// Result alias for guarded mutations.
pub type MutationResult = Result<Mutation, MutationError>;

/// Applies configuration changes under the per-guild config lock.
#[derive(Clone)]
pub struct ConfigService {
    provider: Arc<DataProvider>,
}

impl ConfigService {
    /// Service over a connected provider.
    pub fn new(provider: Arc<DataProvider>) -> Self {
        Self { provider }
    }

    /// Fetch, lock, apply, persist, release.
    ///
    /// The snapshot returned as `previous` is read before the lock is
    /// taken; the lock guards the write, not the read, so a racing writer
    /// can make the snapshot stale. The lock is always released, even when
    /// the write fails; a failed release is logged and left to the TTL.
    ///
    /// # Errors
    /// [`MutationError::Busy`] when the guild's config lock is contended;
    /// [`MutationError::Data`] when fetch or update fails.
    pub async fn mutate<F>(&self, id: &GuildId, apply: F) -> MutationResult
    where
        F: FnOnce(&mut GuildRecord),
    {
        let resource = Keyspace::config_resource(id);

        let mut record = self.provider.guilds().fetch(id).await?;
        let previous = record.clone();

        let handle = self.provider.locks().acquire(&[resource.as_str()]).await?;

        apply(&mut record);
        let outcome = self.provider.guilds().update(id, &record).await;

        if let Err(error) = self.provider.locks().release(handle).await {
            warn!(guild = %id, %error, "config lock release failed, ttl will reclaim");
        }

        outcome?;
        debug!(guild = %id, "configuration mutated");
        Ok(Mutation { previous, record })
    }

    /// Toggle automatic role assignment on member join.
    ///
    /// # Errors
    /// See [`ConfigService::mutate`].
    pub async fn set_auto_role(&self, id: &GuildId, enabled: bool) -> MutationResult {
        self.mutate(id, |record| record.config.auto_role = enabled)
            .await
    }

    /// Change the administrative-leave contact method.
    ///
    /// # Errors
    /// See [`ConfigService::mutate`].
    pub async fn set_contact(&self, id: &GuildId, contact: ContactMethod) -> MutationResult {
        self.mutate(id, move |record| record.config.contact = contact)
            .await
    }

    /// Point the award log at a channel; an empty id clears it.
    ///
    /// # Errors
    /// See [`ConfigService::mutate`].
    pub async fn set_award_channel(
        &self,
        id: &GuildId,
        channel: impl Into<String>,
    ) -> MutationResult {
        let channel = channel.into();
        self.mutate(id, move |record| record.config.channels.award = channel)
            .await
    }
}
