//! On-disk layout of a Location (one snapshot repository directory)
//!
//! ```text
//! <root>/
//!   index.latest              8-byte big-endian generation pointer
//!   index-<n>                 metadata document, one per generation
//!   index.lock                present while a writer holds the Location
//!   checksums-<uuid>.json     per-snapshot checksum manifest
//!   meta-<uuid>.dat
//!   snap-<uuid>.dat
//!   indices/<folder-id>/...   index data shared between snapshots
//! ```

use esnap_core::errors::{ExError, ExErrorKind};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::errors::Result;

pub const POINTER_FILE: &str = "index.latest";
pub const LOCK_FILE: &str = "index.lock";
pub const INDICES_DIR: &str = "indices";

/// A repository directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    root: PathBuf,
}

impl Location {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn pointer_path(&self) -> PathBuf {
        self.root.join(POINTER_FILE)
    }

    pub fn lock_path(&self) -> PathBuf {
        self.root.join(LOCK_FILE)
    }

    /// `index-<generation>`
    pub fn generation_path(&self, generation: u64) -> PathBuf {
        self.root.join(format!("index-{}", generation))
    }

    /// `checksums-<uuid>.json`
    pub fn checksum_path(&self, uuid: &str) -> PathBuf {
        self.root.join(format!("checksums-{}.json", uuid))
    }

    /// Resolve a `/`-separated path relative to the root
    pub fn file(&self, relative: &str) -> PathBuf {
        relative
            .split('/')
            .filter(|part| !part.is_empty())
            .fold(self.root.clone(), |path, part| path.join(part))
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.root.display())
    }
}

/// `indices/<folder-id>`, the manifest key prefix of an index folder
pub fn index_folder_key(folder_id: &str) -> String {
    format!("{}/{}", INDICES_DIR, folder_id)
}

/// Reject identifiers that would escape the Location when joined into a path.
///
/// # Errors
///
/// Returns `InvalidInput` for empty values, `.`/`..`, or values containing a
/// path separator.
pub fn validate_component(what: &str, value: &str) -> Result<()> {
    let bad = value.is_empty()
        || value == "."
        || value == ".."
        || value.contains('/')
        || value.contains('\\');
    if bad {
        return Err(ExError::new(ExErrorKind::InvalidInput)
            .with_op("validate_component")
            .with_message(format!("invalid {}: {:?}", what, value)));
    }
    Ok(())
}
