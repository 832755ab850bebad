use std::io;
use std::path::PathBuf;

use svcs_types::ObjectId;

/// Errors from object store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The root or `objects` path is unusable, or the format marker is
    /// missing, malformed, or disagrees with the requested configuration.
    #[error("cannot initialize store at {path}: {reason}")]
    StorageInit { path: PathBuf, reason: String },

    /// Persisting a new object failed.
    #[error("failed to write object {id}: {source}")]
    StorageWrite {
        id: ObjectId,
        #[source]
        source: io::Error,
    },

    /// Reading or probing the store failed for a reason other than absence.
    #[error("failed to read {path}: {source}")]
    StorageRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// No object is stored under the requested digest.
    #[error("object not found: {0}")]
    ObjectNotFound(String),

    /// Stored content no longer hashes to its name.
    #[error("integrity check failed for {id}: content hashes to {computed}")]
    Integrity { id: ObjectId, computed: ObjectId },
}

impl StoreError {
    /// Returns `true` for [`StoreError::ObjectNotFound`], the one expected,
    /// non-fault condition.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ObjectNotFound(_))
    }

    pub(crate) fn init(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::StorageInit {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn read(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::StorageRead {
            path: path.into(),
            source,
        }
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
