//! Set-difference computation over snapshot uuids.

use crate::diff::model::LocationDiff;
use crate::model::{MetadataDocument, SnapshotRecord};
use std::collections::BTreeSet;

fn uuid_set(doc: &MetadataDocument) -> BTreeSet<&str> {
    doc.snapshots.iter().map(|s| s.uuid.as_str()).collect()
}

/// Uuids present in `src` but absent from `dst`.
///
/// Pure set difference. The returned set iterates in uuid order, which is
/// not meaningful; callers that present results to people should use
/// [`missing_records`].
pub fn missing_snapshots(src: &MetadataDocument, dst: &MetadataDocument) -> BTreeSet<String> {
    let dst_uuids = uuid_set(dst);
    uuid_set(src)
        .into_iter()
        .filter(|uuid| !dst_uuids.contains(uuid))
        .map(str::to_string)
        .collect()
}

/// Source records for every missing uuid, sorted by name then uuid.
///
/// A uuid duplicated inside `src` yields one record (the first).
pub fn missing_records<'a>(
    src: &'a MetadataDocument,
    dst: &MetadataDocument,
) -> Vec<&'a SnapshotRecord> {
    let missing = missing_snapshots(src, dst);
    let mut records: Vec<&SnapshotRecord> = missing
        .iter()
        .filter_map(|uuid| src.find_snapshot(uuid))
        .collect();
    records.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.uuid.cmp(&b.uuid)));
    records
}

/// Full two-sided comparison.
pub fn compare_locations(src: &MetadataDocument, dst: &MetadataDocument) -> LocationDiff {
    let src_uuids = uuid_set(src);
    let dst_uuids = uuid_set(dst);

    LocationDiff {
        missing_at_destination: src_uuids
            .difference(&dst_uuids)
            .map(|s| s.to_string())
            .collect(),
        only_at_destination: dst_uuids
            .difference(&src_uuids)
            .map(|s| s.to_string())
            .collect(),
        in_both: src_uuids.intersection(&dst_uuids).count(),
    }
}
