//! Data-layer error types
//!
//! Three families: [`StoreError`] for backend faults, [`DataError`] for the
//! record store and lifecycle, [`LockError`] for the lock manager. Lock
//! contention and transient connection noise are ordinary outcomes callers
//! branch on, so both get predicate helpers rather than string matching.

use std::io;

use thiserror::Error;

/// Errors surfaced by backend document and cache stores.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend was temporarily unreachable.
    #[error("store unavailable: {source}")]
    Unavailable {
        /// Underlying I/O failure.
        #[source]
        source: io::Error,
    },

    /// The backend rejected or failed the operation.
    #[error("store backend error: {0}")]
    Backend(String),

    /// A payload could not be encoded or decoded.
    #[error("store payload error: {0}")]
    Payload(#[from] serde_json::Error),

    /// The operation did not complete within its deadline.
    #[error("store operation timed out")]
    Timeout,

    /// The operation ran before `connect()` succeeded.
    #[error("store is not connected")]
    NotConnected,
}

impl StoreError {
    /// Wrap an I/O failure as a backend-unreachable error.
    #[inline]
    pub fn unavailable(source: io::Error) -> Self {
        Self::Unavailable { source }
    }

    /// Wrap a backend-specific failure message.
    #[inline]
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend(message.into())
    }

    /// True for reset-style connection noise that is logged but not
    /// reported to error tracking.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Unavailable { source } => matches!(
                source.kind(),
                io::ErrorKind::ConnectionReset
                    | io::ErrorKind::ConnectionAborted
                    | io::ErrorKind::BrokenPipe
            ),
            _ => false,
        }
    }
}

impl From<sled::Error> for StoreError {
    fn from(err: sled::Error) -> Self {
        match err {
            sled::Error::Io(source) => Self::Unavailable { source },
            other => Self::Backend(other.to_string()),
        }
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors surfaced by the guild record store and the lifecycle provider.
#[derive(Debug, Error)]
pub enum DataError {
    /// A backend could not be reached during startup.
    #[error("backend connect failed: {backend}: {source}")]
    Connect {
        /// Which backend failed ("cache" or "documents").
        backend: &'static str,
        /// The underlying store fault.
        #[source]
        source: StoreError,
    },

    /// A store operation failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl DataError {
    /// Wrap a startup connect failure for the named backend.
    #[inline]
    pub fn connect(backend: &'static str, source: StoreError) -> Self {
        Self::Connect { backend, source }
    }
}

/// Result alias for data operations.
pub type DataResult<T> = Result<T, DataError>;

/// Errors surfaced by the distributed lock manager.
#[derive(Debug, Error)]
pub enum LockError {
    /// Another holder owns the resource and did not release it within the
    /// retry budget.
    #[error("lock contended: {resource}")]
    Contended {
        /// The contended resource key.
        resource: String,
    },

    /// The cache backend failed while acquiring or releasing.
    #[error("lock store error: {0}")]
    Store(#[from] StoreError),
}

impl LockError {
    /// Wrap the contended resource key.
    #[inline]
    pub fn contended(resource: impl Into<String>) -> Self {
        Self::Contended {
            resource: resource.into(),
        }
    }

    /// True when acquisition failed because someone else holds the lock,
    /// as opposed to a backend fault.
    #[inline]
    #[must_use]
    pub fn is_contended(&self) -> bool {
        matches!(self, Self::Contended { .. })
    }
}

/// Result alias for lock operations.
pub type LockResult<T> = Result<T, LockError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_errors_are_transient() {
        let err = StoreError::unavailable(io::Error::new(io::ErrorKind::ConnectionReset, "peer"));
        assert!(err.is_transient());

        let err = StoreError::unavailable(io::Error::new(io::ErrorKind::NotFound, "gone"));
        assert!(!err.is_transient());

        assert!(!StoreError::Timeout.is_transient());
        assert!(!StoreError::backend("boom").is_transient());
    }

    #[test]
    fn contended_predicate() {
        assert!(LockError::contended("config:1").is_contended());
        assert!(!LockError::Store(StoreError::Timeout).is_contended());
    }

    #[test]
    fn connect_error_names_backend() {
        let err = DataError::connect("cache", StoreError::Timeout);
        assert!(err.to_string().contains("cache"));
    }
}
