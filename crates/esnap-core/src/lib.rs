//! esnap Core - pure domain kernel for snapshot repository synchronization
//!
//! This crate holds everything that does not touch the filesystem:
//! - Metadata document model (snapshots, indices, generations)
//! - Checksum manifest model and size accounting
//! - Diff engine (snapshots present at a source but missing at a destination)
//! - Merge engine (fold one snapshot's metadata into a destination document)
//! - Structured error and logging facilities shared by every crate

pub mod diff;
pub mod errors;
pub mod logging_facility;
pub mod merge;
pub mod model;
pub mod queries;
pub mod render;

// Re-export commonly used types
pub use diff::missing_snapshots;
pub use errors::{EsnapError, ExError, ExErrorKind, Result};
pub use merge::merge_snapshot;
pub use model::{
    ChecksumEntry, ChecksumManifest, FileDigest, IndexRecord, MetadataDocument, SnapshotRecord,
};

#[doc(hidden)]
pub use esnap_core_types as __types;
