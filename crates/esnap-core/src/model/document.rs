//! Metadata document schema (`index-<generation>` files).
//!
//! Only the fields esnap reasons about are typed. Everything else a
//! repository writer puts in these documents is carried through untouched via
//! flattened `extra` maps, so rewriting a document never drops data.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// One immutable generation of a Location's metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetadataDocument {
    /// Snapshots known at this generation; identity is `uuid`
    #[serde(default)]
    pub snapshots: Vec<SnapshotRecord>,

    /// Index name → record
    #[serde(default)]
    pub indices: BTreeMap<String, IndexRecord>,

    /// Carried through verbatim, never computed here
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_version: Option<Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One uuid-identified backup unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotRecord {
    pub uuid: String,

    /// Human label, not guaranteed unique
    #[serde(default)]
    pub name: String,

    /// Writers use either a string ("SUCCESS") or a numeric code
    #[serde(default)]
    pub state: Value,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Links an index name to its on-disk folder and the snapshots using it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexRecord {
    /// Folder name under `indices/`
    pub id: String,

    #[serde(default)]
    pub snapshots: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shard_generations: Option<Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Files and folders that make up one snapshot at a Location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotPayload {
    /// Top-level metadata files (`meta-<uuid>.dat`, `snap-<uuid>.dat`)
    pub files: Vec<String>,
    /// Index folder ids under `indices/`, in index-name order
    pub index_folders: Vec<String>,
}

impl SnapshotRecord {
    /// Build a record with the four typed fields set.
    pub fn new(
        uuid: impl Into<String>,
        name: impl Into<String>,
        state: impl Into<Value>,
        version: Option<String>,
    ) -> Self {
        Self {
            uuid: uuid.into(),
            name: name.into(),
            state: state.into(),
            version,
            extra: Map::new(),
        }
    }

    /// State rendered for display (`SUCCESS`, `1`, ...)
    pub fn state_label(&self) -> String {
        match &self.state {
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        }
    }
}

impl IndexRecord {
    pub fn new(id: impl Into<String>, snapshots: Vec<String>) -> Self {
        Self {
            id: id.into(),
            snapshots,
            shard_generations: None,
            extra: Map::new(),
        }
    }

    /// Whether this index is referenced by the given snapshot
    pub fn references(&self, uuid: &str) -> bool {
        self.snapshots.iter().any(|s| s == uuid)
    }
}

impl MetadataDocument {
    /// The implicit generation-0 document: no snapshots, no indices.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether any snapshot record carries this uuid
    pub fn contains_snapshot(&self, uuid: &str) -> bool {
        self.snapshots.iter().any(|s| s.uuid == uuid)
    }

    /// First snapshot record with this uuid
    pub fn find_snapshot(&self, uuid: &str) -> Option<&SnapshotRecord> {
        self.snapshots.iter().find(|s| s.uuid == uuid)
    }

    /// First snapshot record with this name
    pub fn find_snapshot_by_name(&self, name: &str) -> Option<&SnapshotRecord> {
        self.snapshots.iter().find(|s| s.name == name)
    }

    /// Indices that reference the snapshot, keyed by index name
    pub fn indices_referencing<'a>(
        &'a self,
        uuid: &'a str,
    ) -> impl Iterator<Item = (&'a String, &'a IndexRecord)> + 'a {
        self.indices
            .iter()
            .filter(move |(_, record)| record.references(uuid))
    }

    /// Everything that must be copied to reproduce one snapshot elsewhere.
    pub fn snapshot_payload(&self, uuid: &str) -> SnapshotPayload {
        SnapshotPayload {
            files: vec![meta_file_name(uuid), snap_file_name(uuid)],
            index_folders: self
                .indices_referencing(uuid)
                .map(|(_, record)| record.id.clone())
                .collect(),
        }
    }

    /// Snapshot records sorted by name (display order), uuid as tie-break.
    pub fn snapshots_sorted_by_name(&self) -> Vec<&SnapshotRecord> {
        let mut sorted: Vec<&SnapshotRecord> = self.snapshots.iter().collect();
        sorted.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.uuid.cmp(&b.uuid)));
        sorted
    }
}

/// `meta-<uuid>.dat`
pub fn meta_file_name(uuid: &str) -> String {
    format!("meta-{}.dat", uuid)
}

/// `snap-<uuid>.dat`
pub fn snap_file_name(uuid: &str) -> String {
    format!("snap-{}.dat", uuid)
}
