//! Error handling for esnap-store
//!
//! Wraps esnap-core ExError with store-specific helpers

use esnap_core::errors::{ExError, ExErrorKind};
use std::path::Path;

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Create an IO error
pub fn io_error(operation: &str, err: std::io::Error) -> ExError {
    ExError::new(ExErrorKind::Io)
        .with_op(operation.to_string())
        .with_message(err.to_string())
}

/// Create an IO error naming the file involved
pub fn io_error_at(operation: &str, path: &Path, err: std::io::Error) -> ExError {
    io_error(operation, err).with_path(path.display().to_string())
}

/// Create a not-found error for a missing file
pub fn not_found(operation: &str, path: &Path, what: &str) -> ExError {
    ExError::new(ExErrorKind::NotFound)
        .with_op(operation.to_string())
        .with_path(path.display().to_string())
        .with_message(format!("{} does not exist", what))
}

/// Create a serialization error
pub fn serialization_error(operation: &str, path: &Path, reason: impl std::fmt::Display) -> ExError {
    ExError::new(ExErrorKind::Serialization)
        .with_op(operation.to_string())
        .with_path(path.display().to_string())
        .with_message(reason.to_string())
}

/// Create an integrity error naming the file, expected and observed values
pub fn integrity_mismatch(path: &Path, what: &str, expected: &str, observed: &str) -> ExError {
    ExError::new(ExErrorKind::IntegrityMismatch)
        .with_op("verify_file")
        .with_path(path.display().to_string())
        .with_expected(expected.to_string())
        .with_observed(observed.to_string())
        .with_message(format!("{} mismatch", what))
}

/// Create a lock-contention error
pub fn location_locked(lock_path: &Path) -> ExError {
    ExError::new(ExErrorKind::Concurrency)
        .with_op("acquire_lock")
        .with_path(lock_path.display().to_string())
        .with_message(
            "another writer holds this location; remove the lock file if no esnap process is running",
        )
}
