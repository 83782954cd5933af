//! Merge engine behaviour: additive folding, idempotent re-merge, and
//! all-or-nothing conflict reporting.

use esnap_core::errors::{EsnapError, ExError, ExErrorKind};
use esnap_core::merge::merge_snapshot;
use esnap_core::{IndexRecord, MetadataDocument, SnapshotRecord};
use serde_json::json;

fn source_with_u1() -> MetadataDocument {
    let mut src = MetadataDocument::empty();
    src.snapshots.push(SnapshotRecord::new(
        "u1",
        "nightly-1",
        "SUCCESS",
        Some("7.10".to_string()),
    ));
    src.snapshots
        .push(SnapshotRecord::new("u2", "nightly-2", "SUCCESS", None));
    src.indices.insert(
        "idx-a".to_string(),
        IndexRecord::new("folderA", vec!["u1".to_string(), "u2".to_string()]),
    );
    src.indices.insert(
        "idx-b".to_string(),
        IndexRecord::new("folderB", vec!["u2".to_string()]),
    );
    src.min_version = Some(json!("7.9.0"));
    src
}

#[test]
fn test_merge_adds_snapshot_and_singleton_index() {
    let src = source_with_u1();

    let merged = merge_snapshot(&src, MetadataDocument::empty(), "u1").unwrap();

    assert_eq!(merged.snapshots.len(), 1);
    assert_eq!(merged.snapshots[0].uuid, "u1");
    assert_eq!(merged.indices.len(), 1);
    let idx_a = &merged.indices["idx-a"];
    assert_eq!(idx_a.id, "folderA");
    assert_eq!(idx_a.snapshots, vec!["u1"]);
    assert!(!merged.indices.contains_key("idx-b"));
}

#[test]
fn test_re_merge_is_noop_on_index_snapshot_list() {
    let src = source_with_u1();

    let once = merge_snapshot(&src, MetadataDocument::empty(), "u1").unwrap();
    let twice = merge_snapshot(&src, once.clone(), "u1").unwrap();

    assert_eq!(twice, once);
    assert_eq!(twice.indices["idx-a"].snapshots, vec!["u1"]);
    assert_eq!(twice.snapshots.len(), 1);
}

#[test]
fn test_merge_preserves_unrelated_destination_entries() {
    let src = source_with_u1();
    let mut dst = MetadataDocument::empty();
    dst.snapshots
        .push(SnapshotRecord::new("old", "archived", "SUCCESS", None));
    dst.indices.insert(
        "legacy".to_string(),
        IndexRecord::new("folderZ", vec!["old".to_string()]),
    );

    let merged = merge_snapshot(&src, dst, "u1").unwrap();

    assert_eq!(merged.snapshots.len(), 2);
    assert_eq!(merged.indices["legacy"].id, "folderZ");
    assert!(merged.indices.contains_key("idx-a"));
}

#[test]
fn test_min_version_only_filled_when_absent() {
    let src = source_with_u1();

    let merged = merge_snapshot(&src, MetadataDocument::empty(), "u1").unwrap();
    assert_eq!(merged.min_version, Some(json!("7.9.0")));

    let mut dst = MetadataDocument::empty();
    dst.min_version = Some(json!("7.0.0"));
    let merged = merge_snapshot(&src, dst, "u1").unwrap();
    assert_eq!(merged.min_version, Some(json!("7.0.0")));
}

#[test]
fn test_conflicting_index_ids_fail_without_mutation() {
    let src = source_with_u1();
    let mut dst = MetadataDocument::empty();
    dst.indices.insert(
        "idx-a".to_string(),
        IndexRecord::new("otherFolder", vec!["zzz".to_string()]),
    );
    dst.indices.insert(
        "idx-b".to_string(),
        IndexRecord::new("folderB", vec!["zzz".to_string()]),
    );

    let err = merge_snapshot(&src, dst, "u2").unwrap_err();

    match &err {
        EsnapError::IndexConflicts { uuid, conflicts } => {
            assert_eq!(uuid, "u2");
            let names: Vec<&str> = conflicts.iter().map(|c| c.index_name.as_str()).collect();
            assert_eq!(names, vec!["idx-a", "idx-b"]);
            assert_eq!(conflicts[0].existing_id, "otherFolder");
            assert_eq!(conflicts[0].incoming_id, "folderA");
        }
        other => panic!("expected IndexConflicts, got {:?}", other),
    }

    let ex: ExError = err.into();
    assert_eq!(ex.kind(), ExErrorKind::Conflict);
}

#[test]
fn test_same_folder_for_another_snapshot_is_still_a_conflict() {
    let src = source_with_u1();
    let once = merge_snapshot(&src, MetadataDocument::empty(), "u1").unwrap();

    let err = merge_snapshot(&src, once, "u2").unwrap_err();
    assert!(matches!(err, EsnapError::IndexConflicts { .. }));
}

#[test]
fn test_unknown_uuid_is_not_found() {
    let src = source_with_u1();
    let err = merge_snapshot(&src, MetadataDocument::empty(), "missing").unwrap_err();
    assert_eq!(
        err,
        EsnapError::SnapshotNotFound {
            uuid: "missing".to_string()
        }
    );
}
