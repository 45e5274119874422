//! Session errors

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

use crate::migrate::MigrationError;
use crate::storage::StorageError;

/// Shown when a draft write is rejected for size
pub const CAPACITY_MESSAGE: &str =
    "Failed to save changes locally. The images are still too large. Please try uploading smaller images.";

/// Shown when an import file is not a content document
pub const IMPORT_MESSAGE: &str =
    "Failed to import content. Please make sure you are uploading a valid backup file.";

/// Errors returned by session operations
#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    InvalidFormat(#[from] MigrationError),

    #[error("Failed to save changes locally. The images are still too large. Please try uploading smaller images.")]
    CapacityExceeded {
        #[source]
        source: Arc<StorageError>,
    },

    #[error("Storage error: {source}")]
    Storage {
        #[source]
        source: Arc<StorageError>,
    },

    #[error("This operation needs an authenticated editor session")]
    ReadOnly,

    #[error("Failed to export content to '{path}': {source}")]
    Export {
        path: PathBuf,
        #[source]
        source: StorageError,
    },
}

impl SessionError {
    /// Text to put in front of the user for the actionable failures
    pub fn user_message(&self) -> Option<&'static str> {
        match self {
            SessionError::CapacityExceeded { .. } => Some(CAPACITY_MESSAGE),
            SessionError::InvalidFormat(_) => Some(IMPORT_MESSAGE),
            _ => None,
        }
    }

    pub fn is_capacity(&self) -> bool {
        matches!(self, SessionError::CapacityExceeded { .. })
    }

    fn from_shared(source: Arc<StorageError>) -> Self {
        if source.is_capacity() {
            SessionError::CapacityExceeded { source }
        } else {
            SessionError::Storage { source }
        }
    }
}

impl From<StorageError> for SessionError {
    fn from(err: StorageError) -> Self {
        Self::from_shared(Arc::new(err))
    }
}

impl From<PersistFailure> for SessionError {
    fn from(failure: PersistFailure) -> Self {
        Self::from_shared(failure.error)
    }
}

impl From<serde_json::Error> for SessionError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err).into()
    }
}

/// A draft write that did not make it to the slot store
///
/// The in-memory draft is kept; only durability was lost.
#[derive(Debug, Clone)]
pub struct PersistFailure {
    /// Generation of the write that failed
    pub generation: u64,
    pub error: Arc<StorageError>,
}

impl PersistFailure {
    pub fn is_capacity(&self) -> bool {
        self.error.is_capacity()
    }
}

impl std::fmt::Display for PersistFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_capacity() {
            f.write_str(CAPACITY_MESSAGE)
        } else {
            write!(f, "draft write #{} failed: {}", self.generation, self.error)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Slot;

    #[test]
    fn test_capacity_storage_error_maps_to_capacity() {
        let err: SessionError = StorageError::CapacityExceeded {
            slot: Slot::Draft,
            size: 10,
            limit: 5,
        }
        .into();
        assert!(err.is_capacity());
        assert_eq!(err.user_message(), Some(CAPACITY_MESSAGE));
        assert_eq!(err.to_string(), CAPACITY_MESSAGE);
    }

    #[test]
    fn test_other_storage_error_maps_to_storage() {
        let err: SessionError = StorageError::Database(rusqlite::Error::InvalidQuery).into();
        assert!(matches!(err, SessionError::Storage { .. }));
        assert!(err.user_message().is_none());
    }

    #[test]
    fn test_invalid_format_message() {
        let err: SessionError = MigrationError::InvalidFormat("faqs is not a list".into()).into();
        assert_eq!(err.user_message(), Some(IMPORT_MESSAGE));
        assert!(err.to_string().contains("faqs is not a list"));
    }
}
