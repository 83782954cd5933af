//! Merge engine.
//!
//! Folds the metadata of one snapshot from a source document into a
//! destination document. Destination entries unrelated to the snapshot are
//! preserved as-is; the caller appends the result as a new generation.
//!
//! Index handling: every source index referencing the snapshot is projected
//! down to `{id, snapshots: [uuid], shard_generations?}`. A projection whose
//! name is new to the destination is inserted. A name the destination
//! already holds is accepted only when it is the exact same projection
//! already merged earlier (same folder id, already lists the uuid); any other
//! overlap is a conflict. All conflicts are collected before anything is
//! mutated, so a failed merge leaves the destination document untouched.

use crate::errors::{EsnapError, IndexConflict, Result};
use crate::model::{IndexRecord, MetadataDocument};
use serde_json::Map;

/// Merge one snapshot's records from `src` into `dst`.
///
/// # Errors
///
/// - `SnapshotNotFound` if `src` has no record with this uuid
/// - `IndexConflicts` listing every index name the destination already
///   defines differently
pub fn merge_snapshot(
    src: &MetadataDocument,
    mut dst: MetadataDocument,
    uuid: &str,
) -> Result<MetadataDocument> {
    let selected: Vec<_> = src.snapshots.iter().filter(|s| s.uuid == uuid).collect();
    if selected.is_empty() {
        return Err(EsnapError::SnapshotNotFound {
            uuid: uuid.to_string(),
        });
    }

    let projections: Vec<(String, IndexRecord)> = src
        .indices_referencing(uuid)
        .map(|(name, record)| (name.clone(), project_index(record, uuid)))
        .collect();

    let mut conflicts = Vec::new();
    let mut additions = Vec::new();
    for (name, projection) in projections {
        match dst.indices.get(&name) {
            None => additions.push((name, projection)),
            Some(existing) if existing.id == projection.id && existing.references(uuid) => {}
            Some(existing) => conflicts.push(IndexConflict {
                index_name: name,
                existing_id: existing.id.clone(),
                incoming_id: projection.id,
            }),
        }
    }
    if !conflicts.is_empty() {
        return Err(EsnapError::IndexConflicts {
            uuid: uuid.to_string(),
            conflicts,
        });
    }

    for record in selected {
        if !dst.contains_snapshot(uuid) {
            dst.snapshots.push(record.clone());
        }
    }

    for (name, projection) in additions {
        tracing::debug!(index_name = %name, folder_id = %projection.id, "Adding index to destination");
        dst.indices.insert(name, projection);
    }

    if dst.min_version.is_none() {
        dst.min_version = src.min_version.clone();
    }

    Ok(dst)
}

/// Singleton view of an index as seen by one snapshot.
fn project_index(record: &IndexRecord, uuid: &str) -> IndexRecord {
    IndexRecord {
        id: record.id.clone(),
        snapshots: vec![uuid.to_string()],
        shard_generations: record.shard_generations.clone(),
        extra: Map::new(),
    }
}
