//! Storage error handling
//!
//! Provides typed errors for storage operations with descriptive messages
//! and recovery suggestions. A write rejected for size is kept apart from every
//! other failure: the remedy (shrink embedded images) is different from a retry.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::models::Slot;

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StorageError {
    /// The payload does not fit in the slot
    #[error("Document for the {slot} slot is too large to store ({size} bytes, limit {limit} bytes). Reduce the size of embedded images and try again.")]
    CapacityExceeded {
        slot: Slot,
        size: usize,
        limit: usize,
    },

    /// The database reported it is full
    #[error("Storage is full while writing the {slot} slot: {source}")]
    StorageFull {
        slot: Slot,
        #[source]
        source: rusqlite::Error,
    },

    /// Failed to create data directory
    #[error("Failed to create data directory '{path}': {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Permission denied accessing path
    #[error("Permission denied: cannot access '{path}'. Check file permissions.")]
    PermissionDenied {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Disk is full or quota exceeded
    #[error(
        "Disk full or quota exceeded while writing to '{path}'. Free up disk space and try again."
    )]
    DiskFull {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Failed to write file
    #[error("Failed to write '{path}': {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// File not found (when expected to exist)
    #[error("File not found: '{path}'")]
    NotFound { path: PathBuf },

    /// A document could not be serialized for storage
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// SQLite database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Generic I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl StorageError {
    /// Create an error from an I/O error with path context
    ///
    /// Classifies the error based on its kind (permission, disk full, etc.)
    pub fn from_io(error: io::Error, path: PathBuf) -> Self {
        match error.kind() {
            io::ErrorKind::PermissionDenied => StorageError::PermissionDenied {
                path,
                source: error,
            },
            io::ErrorKind::NotFound => StorageError::NotFound { path },
            _ if is_disk_full_error(&error) => StorageError::DiskFull {
                path,
                source: error,
            },
            _ => StorageError::WriteError {
                path,
                source: error,
            },
        }
    }

    /// Classify a SQLite error raised while writing a slot
    pub fn from_write(error: rusqlite::Error, slot: Slot) -> Self {
        let full = matches!(
            error.sqlite_error_code(),
            Some(rusqlite::ErrorCode::DiskFull) | Some(rusqlite::ErrorCode::TooBig)
        );
        if full {
            StorageError::StorageFull {
                slot,
                source: error,
            }
        } else {
            StorageError::Database(error)
        }
    }

    /// Whether this failure means the payload is too big for the store
    pub fn is_capacity(&self) -> bool {
        matches!(
            self,
            StorageError::CapacityExceeded { .. }
                | StorageError::StorageFull { .. }
                | StorageError::DiskFull { .. }
        )
    }

    /// Get a recovery suggestion for this error
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            StorageError::CapacityExceeded { .. } | StorageError::StorageFull { .. } => {
                Some("The images are still too large. Please try uploading smaller images.")
            }
            StorageError::DiskFull { .. } => Some("Free up disk space and try again."),
            StorageError::PermissionDenied { .. } => {
                Some("Check file and directory permissions. You may need to run with different permissions or change ownership.")
            }
            StorageError::CreateDirectory { .. } => {
                Some("Check that the parent directory exists and you have write permissions.")
            }
            _ => None,
        }
    }
}

/// Check if an I/O error indicates disk full condition
fn is_disk_full_error(error: &io::Error) -> bool {
    let msg = error.to_string().to_lowercase();
    msg.contains("no space left")
        || msg.contains("disk full")
        || msg.contains("quota exceeded")
        || msg.contains("not enough space")
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_is_distinguishable() {
        let err = StorageError::CapacityExceeded {
            slot: Slot::Draft,
            size: 6_000_000,
            limit: 5_000_000,
        };
        assert!(err.is_capacity());
        assert!(err.recovery_suggestion().unwrap().contains("smaller images"));

        let msg = err.to_string();
        assert!(msg.contains("draft"));
        assert!(msg.contains("6000000"));
    }

    #[test]
    fn test_generic_database_error_is_not_capacity() {
        let err = StorageError::Database(rusqlite::Error::InvalidQuery);
        assert!(!err.is_capacity());
        assert!(err.recovery_suggestion().is_none());
    }

    #[test]
    fn test_permission_denied_classification() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let err = StorageError::from_io(io_err, PathBuf::from("/test/path"));

        assert!(matches!(err, StorageError::PermissionDenied { .. }));
        assert!(err.recovery_suggestion().is_some());
    }

    #[test]
    fn test_not_found_classification() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err = StorageError::from_io(io_err, PathBuf::from("/missing/file"));

        assert!(matches!(err, StorageError::NotFound { .. }));
    }

    #[test]
    fn test_disk_full_detection() {
        let io_err = io::Error::new(io::ErrorKind::Other, "No space left on device");
        let err = StorageError::from_io(io_err, PathBuf::from("/full/disk"));

        assert!(matches!(err, StorageError::DiskFull { .. }));
        assert!(err.is_capacity());
    }

    #[test]
    fn test_sqlite_full_classification() {
        let sqlite_err = rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_FULL),
            None,
        );
        let err = StorageError::from_write(sqlite_err, Slot::Live);
        assert!(matches!(err, StorageError::StorageFull { slot: Slot::Live, .. }));
        assert!(err.is_capacity());
    }
}
