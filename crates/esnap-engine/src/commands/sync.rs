//! One-way sync: copy every snapshot the destination lacks.

use esnap_core::diff::{compare_locations, missing_records};
use esnap_core::{log_op_end, log_op_error, log_op_start};
use esnap_store::errors::Result;
use esnap_store::{index_log, CopyStats, Location};
use std::time::Instant;

use super::copy::{copy_snapshot, CopyReport};

/// Per-snapshot reports, in the order the copies ran
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub copied: Vec<CopyReport>,
}

impl SyncReport {
    /// Uuids copied, in processing order
    pub fn uuids(&self) -> Vec<&str> {
        self.copied.iter().map(|r| r.uuid.as_str()).collect()
    }

    /// Counters summed over every snapshot
    pub fn totals(&self) -> CopyStats {
        let mut totals = CopyStats::default();
        for report in &self.copied {
            totals.merge(&report.stats);
        }
        totals
    }
}

/// Copy each snapshot present at `src` and missing at `dst`.
///
/// Snapshots are processed by name, then uuid. The first failure stops the
/// run; snapshots copied before it keep their new generations.
///
/// # Errors
///
/// Anything [`copy_snapshot`] returns for the failing snapshot.
pub fn sync(src: &Location, dst: &Location, verify: bool) -> Result<SyncReport> {
    log_op_start!("sync", src = %src, dst = %dst, verify = verify);
    let start = Instant::now();

    let report = sync_impl(src, dst, verify).map_err(|e| {
        log_op_error!(
            "sync",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64
        );
        e
    })?;

    log_op_end!(
        "sync",
        duration_ms = start.elapsed().as_millis() as u64,
        snapshots_copied = report.copied.len() as u64
    );
    Ok(report)
}

fn sync_impl(src: &Location, dst: &Location, verify: bool) -> Result<SyncReport> {
    let (_, src_doc) = index_log::read_latest_or_empty(src)?;
    index_log::ensure_initialized(dst)?;
    let (_, dst_doc) = index_log::read_latest(dst)?;

    let diff = compare_locations(&src_doc, &dst_doc);
    tracing::info!(
        missing = diff.missing_at_destination.len(),
        only_at_destination = diff.only_at_destination.len(),
        in_both = diff.in_both,
        "Compared locations"
    );
    let mut report = SyncReport::default();
    if diff.is_synced() {
        return Ok(report);
    }

    let pending: Vec<String> = missing_records(&src_doc, &dst_doc)
        .into_iter()
        .map(|record| record.uuid.clone())
        .collect();
    for uuid in pending {
        report.copied.push(copy_snapshot(src, dst, &uuid, verify)?);
    }
    Ok(report)
}
