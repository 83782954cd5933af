//! Exclusive writer lock for a Location
//!
//! The lock is the existence of `index.lock`, created with `create_new` so two
//! writers can never both succeed. Dropping the guard removes the file.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::PathBuf;

use crate::errors::{io_error_at, location_locked, Result};
use crate::location::Location;

/// Held while a process mutates a Location's index log
#[derive(Debug)]
pub struct LocationLock {
    path: PathBuf,
}

impl LocationLock {
    /// Take the lock, failing immediately if someone else holds it.
    ///
    /// # Errors
    ///
    /// `Concurrency` if the lock file already exists, `Io` otherwise.
    pub fn acquire(location: &Location) -> Result<Self> {
        let path = location.lock_path();
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut file) => {
                // Owner pid, for whoever has to clean up a stale lock
                let _ = writeln!(file, "{}", std::process::id());
                tracing::debug!(path = %path.display(), "Acquired location lock");
                Ok(Self { path })
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Err(location_locked(&path)
                .with_location(location.to_string())),
            Err(e) => Err(io_error_at("acquire_lock", &path, e)),
        }
    }
}

impl Drop for LocationLock {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            tracing::warn!(path = %self.path.display(), error = %e, "Failed to release location lock");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use esnap_core::ExErrorKind;
    use tempfile::TempDir;

    #[test]
    fn test_second_acquire_fails_until_release() {
        let dir = TempDir::new().unwrap();
        let location = Location::new(dir.path());

        let guard = LocationLock::acquire(&location).unwrap();
        let err = LocationLock::acquire(&location).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::Concurrency);

        drop(guard);
        assert!(!location.lock_path().exists());
        let _again = LocationLock::acquire(&location).unwrap();
    }
}
