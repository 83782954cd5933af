//! Fixed-width snapshot tables.

use crate::model::{gigabytes_rounded, SnapshotRecord};
use std::fmt::Write as _;

const BYTES_PER_GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// One line of a snapshot listing.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotRow {
    pub uuid: String,
    pub name: String,
    pub state: String,
    pub version: String,
    /// Sum of the snapshot's checksum manifest, when one exists at the Location
    pub size_bytes: Option<u64>,
}

impl From<&SnapshotRecord> for SnapshotRow {
    fn from(record: &SnapshotRecord) -> Self {
        Self {
            uuid: record.uuid.clone(),
            name: record.name.clone(),
            state: record.state_label(),
            version: record.version.clone().unwrap_or_default(),
            size_bytes: None,
        }
    }
}

/// GiB with two decimals, e.g. `"12.50"`.
pub fn format_gib(bytes: u64) -> String {
    format!("{:.2}", bytes as f64 / BYTES_PER_GIB)
}

/// Render rows as a table. With `with_sizes`, a size column and a folder
/// total footer are added.
pub fn render_snapshot_table(rows: &[SnapshotRow], with_sizes: bool) -> String {
    let mut out = String::new();
    if with_sizes {
        let _ = writeln!(
            out,
            "{:>22} {:>5} {:>8} {:>11} {:>30}",
            "uuid", "state", "version", "size", "name"
        );
    } else {
        let _ = writeln!(
            out,
            "{:>22} {:>5} {:>8} {:>30}",
            "uuid", "state", "version", "name"
        );
    }

    let mut total_bytes = 0u64;
    for row in rows {
        if with_sizes {
            let size = match row.size_bytes {
                Some(bytes) => {
                    total_bytes += bytes;
                    format!("{} GB", format_gib(bytes))
                }
                None => String::new(),
            };
            let _ = writeln!(
                out,
                "{:>22} {:>5} {:>8} {:>11} {:>30}",
                row.uuid, row.state, row.version, size, row.name
            );
        } else {
            let _ = writeln!(
                out,
                "{:>22} {:>5} {:>8} {:>30}",
                row.uuid, row.state, row.version, row.name
            );
        }
    }

    if with_sizes {
        let gigabytes = gigabytes_rounded(total_bytes);
        let _ = writeln!(
            out,
            "Total consumed space for snapshots is {} GB or {} TB",
            gigabytes,
            (gigabytes as f64 / 1024.0).round() as u64
        );
    }
    out
}

/// Header line plus table for snapshots a destination is missing.
pub fn render_missing_summary(rows: &[SnapshotRow]) -> String {
    format!(
        "There are {} snapshots missing\n{}",
        rows.len(),
        render_snapshot_table(rows, false)
    )
}
