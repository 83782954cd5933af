//! Read-only queries over one or two Locations.
//!
//! None of these write to a Location; an uninitialized Location reads as
//! empty.

use esnap_core::diff::missing_records;
use esnap_core::model::gigabytes_rounded;
use esnap_core::queries::{indices_in_snapshot, snapshots_for_index};
use esnap_core::render::SnapshotRow;
use esnap_core::{log_op_end, log_op_error, log_op_start, SnapshotRecord};
use esnap_store::errors::{not_found, Result};
use esnap_store::location::validate_component;
use esnap_store::{checksums, index_log, verify_file, Location};
use std::time::Instant;

/// Snapshots of one Location with their recorded sizes
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotListing {
    pub generation: u64,
    /// Sorted by name, then uuid
    pub rows: Vec<SnapshotRow>,
    /// Sum of every listed snapshot's manifest
    pub total_bytes: u64,
}

/// Space recorded for one snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiskUsage {
    pub total_bytes: u64,
    /// Whole GiB, rounded to nearest
    pub gigabytes: u64,
}

/// Outcome of a successful verification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerifyReport {
    pub files_verified: u64,
    pub bytes_verified: u64,
}

/// List every snapshot, with sizes where a manifest exists.
///
/// # Errors
///
/// `Serialization` or `Io` if the metadata or a manifest cannot be read.
pub fn list_snapshots(location: &Location) -> Result<SnapshotListing> {
    let (generation, doc) = index_log::read_latest_or_empty(location)?;

    let mut rows = Vec::with_capacity(doc.snapshots.len());
    let mut total_bytes = 0u64;
    for record in doc.snapshots_sorted_by_name() {
        let mut row = SnapshotRow::from(record);
        if checksums::exists(location, &record.uuid) {
            let bytes = checksums::load(location, &record.uuid)?.total_bytes();
            total_bytes += bytes;
            row.size_bytes = Some(bytes);
        }
        rows.push(row);
    }

    Ok(SnapshotListing {
        generation,
        rows,
        total_bytes,
    })
}

/// Source snapshots the destination lacks, sorted by name.
///
/// # Errors
///
/// `Serialization` or `Io` if either Location's metadata cannot be read.
pub fn show_missing(src: &Location, dst: &Location) -> Result<Vec<SnapshotRecord>> {
    let (_, src_doc) = index_log::read_latest_or_empty(src)?;
    let (_, dst_doc) = index_log::read_latest_or_empty(dst)?;
    Ok(missing_records(&src_doc, &dst_doc)
        .into_iter()
        .cloned()
        .collect())
}

/// Bytes recorded in a snapshot's manifest; zero when there is none.
///
/// # Errors
///
/// `InvalidInput` for an unusable uuid, `Serialization` for a corrupt manifest.
pub fn disk_usage(location: &Location, uuid: &str) -> Result<DiskUsage> {
    let total_bytes = checksums::load_or_empty(location, uuid)?.total_bytes();
    Ok(DiskUsage {
        total_bytes,
        gigabytes: gigabytes_rounded(total_bytes),
    })
}

/// Snapshots that include an index, sorted by name.
///
/// # Errors
///
/// `Serialization` or `Io` if the metadata cannot be read.
pub fn find_index(location: &Location, index_name: &str) -> Result<Vec<SnapshotRecord>> {
    let (_, doc) = index_log::read_latest_or_empty(location)?;
    Ok(snapshots_for_index(&doc, index_name)
        .into_iter()
        .cloned()
        .collect())
}

/// Index names a snapshot covers.
///
/// # Errors
///
/// `NotFound` if the Location has no such snapshot.
pub fn snapshot_indices(location: &Location, uuid: &str) -> Result<Vec<String>> {
    let (_, doc) = index_log::read_latest_or_empty(location)?;
    if !doc.contains_snapshot(uuid) {
        return Err(esnap_core::ExError::from(esnap_core::EsnapError::SnapshotNotFound {
            uuid: uuid.to_string(),
        })
        .with_location(location.to_string()));
    }
    Ok(indices_in_snapshot(&doc, uuid)
        .into_iter()
        .map(str::to_string)
        .collect())
}

/// Re-hash every file in a snapshot's manifest at one Location.
///
/// # Errors
///
/// - `NotFound` if the manifest or one of its files is missing
/// - `IntegrityMismatch` at the first file whose size or hash differs
pub fn verify_snapshot(location: &Location, uuid: &str) -> Result<VerifyReport> {
    log_op_start!("verify_snapshot", snapshot_uuid = uuid, location = %location);
    let start = Instant::now();

    let report = verify_snapshot_impl(location, uuid).map_err(|e| {
        let e = e
            .with_snapshot_uuid(uuid.to_string())
            .with_location(location.to_string());
        log_op_error!(
            "verify_snapshot",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64
        );
        e
    })?;

    log_op_end!(
        "verify_snapshot",
        duration_ms = start.elapsed().as_millis() as u64,
        files_verified = report.files_verified
    );
    Ok(report)
}

fn verify_snapshot_impl(location: &Location, uuid: &str) -> Result<VerifyReport> {
    validate_component("snapshot uuid", uuid)?;
    let manifest = checksums::load(location, uuid)?;

    let mut report = VerifyReport {
        files_verified: 0,
        bytes_verified: 0,
    };
    for (key, expected) in manifest.iter() {
        let path = location.file(key);
        if !path.is_file() {
            return Err(not_found("verify_snapshot", &path, "recorded file"));
        }
        verify_file(&path, expected)?;
        tracing::debug!(file = %key, "Verified");
        report.files_verified += 1;
        report.bytes_verified += expected.size;
    }
    Ok(report)
}
