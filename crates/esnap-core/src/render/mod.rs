//! Plain-text rendering of snapshot listings for terminal output.

pub mod snapshot_table;

pub use snapshot_table::{format_gib, render_missing_summary, render_snapshot_table, SnapshotRow};
