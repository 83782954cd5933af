//! Snapshot diff engine.
//!
//! Compares the snapshot sets of two Locations' metadata documents. Identity
//! is the snapshot `uuid`; names are only used to order output for humans.
//!
//! ```
//! use esnap_core::diff::missing_snapshots;
//! use esnap_core::{MetadataDocument, SnapshotRecord};
//!
//! let mut src = MetadataDocument::empty();
//! src.snapshots.push(SnapshotRecord::new("u1", "nightly-1", "SUCCESS", None));
//! let dst = MetadataDocument::empty();
//!
//! assert!(missing_snapshots(&src, &dst).contains("u1"));
//! ```

pub mod engine;
pub mod model;

pub use engine::{compare_locations, missing_records, missing_snapshots};
pub use model::LocationDiff;
