//! Read-only lookups over a metadata document.

use crate::model::{MetadataDocument, SnapshotRecord};

/// Names of the indices a snapshot covers, in name order.
pub fn indices_in_snapshot<'a>(doc: &'a MetadataDocument, uuid: &'a str) -> Vec<&'a str> {
    doc.indices_referencing(uuid)
        .map(|(name, _)| name.as_str())
        .collect()
}

/// Snapshot records that include the given index, sorted by name then uuid,
/// each uuid once.
///
/// Uuids listed by the index but unknown to `snapshots` are skipped.
pub fn snapshots_for_index<'a>(
    doc: &'a MetadataDocument,
    index_name: &str,
) -> Vec<&'a SnapshotRecord> {
    let Some(index) = doc.indices.get(index_name) else {
        return Vec::new();
    };
    let mut records: Vec<&SnapshotRecord> = index
        .snapshots
        .iter()
        .filter_map(|uuid| doc.find_snapshot(uuid))
        .collect();
    records.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.uuid.cmp(&b.uuid)));
    records.dedup_by(|a, b| a.uuid == b.uuid);
    records
}

/// Live index names with no entry in the document's `indices`, input order kept.
pub fn uncovered_index_names<'a, I>(doc: &MetadataDocument, live: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    live.into_iter()
        .filter(|name| !doc.indices.contains_key(*name))
        .map(str::to_string)
        .collect()
}
