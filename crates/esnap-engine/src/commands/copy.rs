//! Snapshot copy orchestration.
//!
//! ## Pipeline (in order):
//! 1. Read the source's latest document and resolve the snapshot
//! 2. Initialize the destination and read its latest document
//! 3. Short-circuit if the destination already has the snapshot (unless verifying)
//! 4. Check the merge up front so index conflicts fail before any bytes move
//! 5. Copy `meta-<uuid>.dat`, `snap-<uuid>.dat` and every referenced index folder
//! 6. Save the checksum manifest
//! 7. Under the destination lock, merge into its latest document and append a generation
//!
//! A failure after step 4 leaves copied files and their manifest entries in
//! place but no new generation; rerunning the copy resumes from the manifest.

use esnap_core::errors::{EsnapError, ExError};
use esnap_core::model::SnapshotPayload;
use esnap_core::{log_op_end, log_op_error, log_op_start, merge_snapshot, ChecksumManifest};
use esnap_store::errors::Result;
use esnap_store::location::{index_folder_key, validate_component};
use esnap_store::{checksums, copy_tracked, copy_tree, index_log, CopyStats, Location};
use std::time::Instant;

/// What one snapshot copy did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyReport {
    pub uuid: String,
    pub name: String,
    /// Destination generation appended, `None` when nothing new was recorded
    pub generation: Option<u64>,
    /// The destination already listed the snapshot before this run
    pub already_present: bool,
    pub stats: CopyStats,
}

/// Copy one snapshot from `src` to `dst` by uuid.
///
/// # Errors
///
/// - `NotFound` if `src` has no such snapshot or a referenced folder is missing
/// - `Conflict` if the destination already maps one of its index names elsewhere
/// - `IntegrityMismatch` when `verify` finds a corrupted destination file
/// - `Io`, `Concurrency`, `Serialization` from the store
pub fn copy_snapshot(src: &Location, dst: &Location, uuid: &str, verify: bool) -> Result<CopyReport> {
    log_op_start!(
        "copy_snapshot",
        snapshot_uuid = uuid,
        src = %src,
        dst = %dst,
        verify = verify
    );
    let start = Instant::now();

    let report = copy_snapshot_impl(src, dst, uuid, verify).map_err(|e| {
        log_op_error!(
            "copy_snapshot",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64,
            snapshot_uuid = uuid
        );
        e
    })?;

    log_op_end!(
        "copy_snapshot",
        duration_ms = start.elapsed().as_millis() as u64,
        snapshot_uuid = uuid,
        files_copied = report.stats.files_copied,
        bytes_copied = report.stats.bytes_copied
    );
    Ok(report)
}

/// Copy the first source snapshot whose name matches.
///
/// # Errors
///
/// `NotFound` if no source snapshot carries the name, otherwise anything
/// [`copy_snapshot`] returns.
pub fn copy_snapshot_by_name(
    src: &Location,
    dst: &Location,
    name: &str,
    verify: bool,
) -> Result<CopyReport> {
    log_op_start!("copy_snapshot_by_name", snapshot_name = name, src = %src, dst = %dst);
    let start = Instant::now();

    let report = resolve_name(src, name)
        .and_then(|uuid| copy_snapshot(src, dst, &uuid, verify))
        .map_err(|e| {
            log_op_error!(
                "copy_snapshot_by_name",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            e
        })?;

    log_op_end!(
        "copy_snapshot_by_name",
        duration_ms = start.elapsed().as_millis() as u64,
        snapshot_uuid = report.uuid.as_str()
    );
    Ok(report)
}

fn resolve_name(src: &Location, name: &str) -> Result<String> {
    let (_, src_doc) = index_log::read_latest_or_empty(src)?;
    src_doc
        .find_snapshot_by_name(name)
        .map(|record| record.uuid.clone())
        .ok_or_else(|| {
            ExError::from(EsnapError::SnapshotNameNotFound {
                name: name.to_string(),
            })
            .with_op("copy_snapshot_by_name")
            .with_location(src.to_string())
        })
}

fn copy_snapshot_impl(src: &Location, dst: &Location, uuid: &str, verify: bool) -> Result<CopyReport> {
    validate_component("snapshot uuid", uuid)?;

    let (_, src_doc) = index_log::read_latest_or_empty(src)?;
    let record = src_doc.find_snapshot(uuid).ok_or_else(|| {
        ExError::from(EsnapError::SnapshotNotFound {
            uuid: uuid.to_string(),
        })
        .with_op("copy_snapshot")
        .with_location(src.to_string())
    })?;

    index_log::ensure_initialized(dst)?;
    let (_, dst_doc) = index_log::read_latest(dst)?;

    let already_present = dst_doc.contains_snapshot(uuid);
    let mut report = CopyReport {
        uuid: uuid.to_string(),
        name: record.name.clone(),
        generation: None,
        already_present,
        stats: CopyStats::default(),
    };
    if already_present && !verify {
        tracing::info!(snapshot_uuid = uuid, dst = %dst, "Snapshot already present, skipping");
        return Ok(report);
    }

    if !already_present {
        merge_snapshot(&src_doc, dst_doc, uuid)
            .map_err(|e| ExError::from(e).with_location(dst.to_string()))?;
    }

    let payload = src_doc.snapshot_payload(uuid);
    for folder in &payload.index_folders {
        validate_component("index folder id", folder)?;
    }

    let loaded = checksums::load_or_empty(dst, uuid)?;
    let mut manifest = loaded.clone();
    let copied = copy_payload(src, dst, &payload, &mut manifest, verify, &mut report.stats);
    if let Err(e) = copied {
        if manifest != loaded {
            checksums::save(dst, uuid, &manifest)?;
        }
        return Err(e.with_snapshot_uuid(uuid.to_string()));
    }
    checksums::save(dst, uuid, &manifest)?;

    if already_present {
        tracing::info!(snapshot_uuid = uuid, dst = %dst, "Verified existing snapshot");
        return Ok(report);
    }

    // Merged against the latest document while holding the Location lock
    let generation = index_log::append_with(dst, |latest| {
        merge_snapshot(&src_doc, latest, uuid)
            .map_err(|e| ExError::from(e).with_location(dst.to_string()))
    })?;
    report.generation = Some(generation);
    Ok(report)
}

fn copy_payload(
    src: &Location,
    dst: &Location,
    payload: &SnapshotPayload,
    manifest: &mut ChecksumManifest,
    verify: bool,
    stats: &mut CopyStats,
) -> Result<()> {
    for file in &payload.files {
        copy_tracked(src.root(), dst.root(), file, manifest, verify, stats)?;
    }
    for folder in &payload.index_folders {
        let key = index_folder_key(folder);
        tracing::debug!(folder = %key, "Copying index folder");
        let folder_stats = copy_tree(src.root(), dst.root(), &key, manifest, verify)?;
        stats.merge(&folder_stats);
    }
    Ok(())
}
