#![allow(dead_code)]

use esnap_core::{IndexRecord, MetadataDocument, SnapshotRecord};
use esnap_store::index_log::encode_generation;
use esnap_store::Location;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// A scratch directory holding a `src` and a `dst` Location
pub struct Fixture {
    _dir: TempDir,
    pub src: Location,
    pub dst: Location,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let src = Location::new(dir.path().join("src"));
        let dst = Location::new(dir.path().join("dst"));
        Self { _dir: dir, src, dst }
    }
}

pub fn write_file(root: &Path, relative: &str, content: &[u8]) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// Write `doc` as generation 0 and point `index.latest` at it
pub fn seed_generation_zero(location: &Location, doc: &MetadataDocument) {
    fs::create_dir_all(location.root()).unwrap();
    fs::write(location.generation_path(0), serde_json::to_vec(doc).unwrap()).unwrap();
    fs::write(location.pointer_path(), encode_generation(0)).unwrap();
}

/// Add a snapshot with one index and its files to a document and a Location
pub fn add_snapshot(
    location: &Location,
    doc: &mut MetadataDocument,
    uuid: &str,
    name: &str,
    index_name: &str,
    folder: &str,
) {
    doc.snapshots.push(SnapshotRecord::new(
        uuid,
        name,
        "SUCCESS",
        Some("7.10".to_string()),
    ));
    doc.indices
        .entry(index_name.to_string())
        .or_insert_with(|| IndexRecord::new(folder, Vec::new()))
        .snapshots
        .push(uuid.to_string());

    let root = location.root();
    write_file(root, &format!("meta-{}.dat", uuid), format!("meta of {}", uuid).as_bytes());
    write_file(root, &format!("snap-{}.dat", uuid), format!("snap of {}", uuid).as_bytes());
    write_file(
        root,
        &format!("indices/{}/0/__{}", folder, uuid),
        format!("segment data for {}", uuid).as_bytes(),
    );
    write_file(root, &format!("indices/{}/meta-{}.dat", folder, uuid), b"index meta");
}

/// The single-snapshot source used by most scenarios: uuid "abc", index
/// "logs-1" stored in folder "folderA".
pub fn seed_single_snapshot(location: &Location) -> MetadataDocument {
    let mut doc = MetadataDocument::empty();
    add_snapshot(location, &mut doc, "abc", "s1", "logs-1", "folderA");
    seed_generation_zero(location, &doc);
    doc
}

/// Sum of every regular file size under a directory
pub fn tree_bytes(dir: &Path) -> u64 {
    let mut total = 0;
    for entry in fs::read_dir(dir).unwrap() {
        let entry = entry.unwrap();
        let meta = entry.metadata().unwrap();
        if meta.is_dir() {
            total += tree_bytes(&entry.path());
        } else {
            total += meta.len();
        }
    }
    total
}
