//! Checksum manifest schema (`checksums-<uuid>.json`).
//!
//! Maps a path relative to the Location root (`meta-<uuid>.dat`,
//! `indices/<id>/0/__abc`, ...) to the SHA-1 and size recorded when the file
//! was first copied or registered. Entries are only ever added or replaced,
//! never removed.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

const BYTES_PER_GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Content fingerprint of one file: hex SHA-1 plus byte length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDigest {
    pub sha1: String,
    pub size: u64,
}

/// A manifest entry has exactly the shape of a digest.
pub type ChecksumEntry = FileDigest;

impl fmt::Display for FileDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sha1={} size={}", self.sha1, self.size)
    }
}

/// Per-snapshot path → digest table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChecksumManifest {
    entries: BTreeMap<String, ChecksumEntry>,
}

impl ChecksumManifest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &str) -> Option<&ChecksumEntry> {
        self.entries.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    /// Record (or replace) the digest for a path.
    pub fn insert(&mut self, path: impl Into<String>, entry: ChecksumEntry) {
        self.entries.insert(path.into(), entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in path order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &ChecksumEntry)> {
        self.entries.iter()
    }

    /// Sum of all recorded sizes.
    pub fn total_bytes(&self) -> u64 {
        self.entries.values().map(|e| e.size).sum()
    }
}

/// Bytes expressed in GiB, rounded to the nearest whole number (halves away from zero).
pub fn gigabytes_rounded(bytes: u64) -> u64 {
    (bytes as f64 / BYTES_PER_GIB).round() as u64
}
