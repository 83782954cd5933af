//! Operations that talk to the backup-producing service.

use esnap_core::queries::uncovered_index_names;
use esnap_core::{log_op_end, log_op_error, log_op_start};
use esnap_store::errors::Result;
use esnap_store::{index_log, Location};
use serde_json::Value;
use std::time::Instant;

use crate::service::{BackupService, CreateSnapshotRequest, RemoteIndex};

/// Result of asking the service for a new snapshot
#[derive(Debug, Clone, PartialEq)]
pub enum TakeSnapshotOutcome {
    /// A snapshot with this name already exists in the repository
    AlreadyExists,
    /// Created; carries the service's response body
    Created(Value),
}

/// Live indices the Location does not cover
#[derive(Debug, Clone, PartialEq)]
pub struct CoverageReport {
    /// Live index names with no entry in the Location's latest metadata
    pub missing: Vec<String>,
    /// Uncovered indices whose name starts with `.`
    pub system_indices: usize,
    /// Uncovered indices with a replica count of zero, sorted by name
    pub without_replicas: Vec<RemoteIndex>,
}

/// Create `name` in `repository` unless a snapshot by that name exists.
///
/// # Errors
///
/// `RemoteService` if either call fails, `InvalidInput` for an empty index list.
pub fn take_snapshot<S: BackupService + ?Sized>(
    service: &S,
    repository: &str,
    name: &str,
    indices: &[String],
) -> Result<TakeSnapshotOutcome> {
    log_op_start!("take_snapshot", repository = repository, snapshot_name = name);
    let start = Instant::now();

    let outcome = take_snapshot_impl(service, repository, name, indices).map_err(|e| {
        log_op_error!(
            "take_snapshot",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64
        );
        e
    })?;

    log_op_end!(
        "take_snapshot",
        duration_ms = start.elapsed().as_millis() as u64,
        created = matches!(outcome, TakeSnapshotOutcome::Created(_))
    );
    Ok(outcome)
}

fn take_snapshot_impl<S: BackupService + ?Sized>(
    service: &S,
    repository: &str,
    name: &str,
    indices: &[String],
) -> Result<TakeSnapshotOutcome> {
    let request = CreateSnapshotRequest::for_indices(indices);
    if request.indices.is_empty() {
        return Err(esnap_core::ExError::new(esnap_core::ExErrorKind::InvalidInput)
            .with_op("take_snapshot")
            .with_message("no indices given"));
    }

    let existing = service.list_snapshots(repository)?;
    if existing.iter().any(|s| s.id == name) {
        tracing::info!(repository = repository, snapshot_name = name, "Snapshot already exists");
        return Ok(TakeSnapshotOutcome::AlreadyExists);
    }

    let body = service.create_snapshot(repository, name, &request)?;
    Ok(TakeSnapshotOutcome::Created(body))
}

/// Compare the service's live indices with a Location's latest metadata.
///
/// # Errors
///
/// `RemoteService` if the listing fails, store errors reading the Location.
pub fn uncovered_indices<S: BackupService + ?Sized>(
    service: &S,
    location: &Location,
) -> Result<CoverageReport> {
    log_op_start!("uncovered_indices", location = %location);
    let start = Instant::now();

    let report = uncovered_indices_impl(service, location).map_err(|e| {
        log_op_error!(
            "uncovered_indices",
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64
        );
        e
    })?;

    log_op_end!(
        "uncovered_indices",
        duration_ms = start.elapsed().as_millis() as u64,
        missing = report.missing.len() as u64
    );
    Ok(report)
}

fn uncovered_indices_impl<S: BackupService + ?Sized>(
    service: &S,
    location: &Location,
) -> Result<CoverageReport> {
    let live = service.list_indices()?;
    let (_, doc) = index_log::read_latest_or_empty(location)?;

    let missing = uncovered_index_names(&doc, live.iter().map(|i| i.index.as_str()));
    let system_indices = live
        .iter()
        .filter(|i| i.is_system() && !doc.indices.contains_key(&i.index))
        .count();
    let mut without_replicas: Vec<RemoteIndex> = live
        .into_iter()
        .filter(|i| i.has_no_replicas() && !doc.indices.contains_key(&i.index))
        .collect();
    without_replicas.sort_by(|a, b| a.index.cmp(&b.index));

    Ok(CoverageReport {
        missing,
        system_indices,
        without_replicas,
    })
}
