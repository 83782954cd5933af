//! esnap Store - filesystem layer for snapshot repositories
//!
//! Provides:
//! - Location layout (`index.latest`, `index-<n>`, `checksums-<uuid>.json`, `indices/`)
//! - Versioned metadata index log with an 8-byte big-endian generation pointer
//! - Checksum manifest persistence
//! - Streaming SHA-1 file digests
//! - Checksum-verified file and tree copy

pub mod atomic;
pub mod checksums;
pub mod copy;
pub mod digest;
pub mod errors;
pub mod index_log;
pub mod location;

// Re-export key types
pub use copy::{copy_file, copy_tracked, copy_tree, verify_file, CopyOutcome, CopyStats};
pub use errors::Result;
pub use location::Location;
