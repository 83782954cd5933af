//! Domain models persisted at a Location.

pub mod checksum;
pub mod document;

pub use checksum::{gigabytes_rounded, ChecksumEntry, ChecksumManifest, FileDigest};
pub use document::{
    meta_file_name, snap_file_name, IndexRecord, MetadataDocument, SnapshotPayload,
    SnapshotRecord,
};
