//! Diff engine: missing_snapshots is exactly the uuid set difference.

use esnap_core::diff::{compare_locations, missing_snapshots};
use esnap_core::{MetadataDocument, SnapshotRecord};
use proptest::prelude::*;
use std::collections::BTreeSet;

fn doc_with(uuids: &[&str]) -> MetadataDocument {
    let mut doc = MetadataDocument::empty();
    for uuid in uuids {
        doc.snapshots
            .push(SnapshotRecord::new(*uuid, format!("name-{}", uuid), "SUCCESS", None));
    }
    doc
}

#[test]
fn test_missing_snapshots_example() {
    let src = doc_with(&["u1", "u2", "u3"]);
    let dst = doc_with(&["u2"]);

    let missing = missing_snapshots(&src, &dst);
    let expected: BTreeSet<String> = ["u1", "u3"].iter().map(|s| s.to_string()).collect();
    assert_eq!(missing, expected);
}

#[test]
fn test_missing_snapshots_empty_sides() {
    let empty = MetadataDocument::empty();
    let src = doc_with(&["u1"]);

    assert!(missing_snapshots(&empty, &src).is_empty());
    assert_eq!(missing_snapshots(&src, &empty).len(), 1);
    assert!(missing_snapshots(&src, &src).is_empty());
}

#[test]
fn test_names_do_not_affect_identity() {
    let mut src = MetadataDocument::empty();
    src.snapshots
        .push(SnapshotRecord::new("u1", "same-name", "SUCCESS", None));
    let mut dst = MetadataDocument::empty();
    dst.snapshots
        .push(SnapshotRecord::new("u9", "same-name", "SUCCESS", None));

    assert!(missing_snapshots(&src, &dst).contains("u1"));
}

proptest! {
    #[test]
    fn prop_missing_is_set_difference(
        a in proptest::collection::btree_set("[a-z0-9]{1,6}", 0..20),
        b in proptest::collection::btree_set("[a-z0-9]{1,6}", 0..20),
    ) {
        let a_refs: Vec<&str> = a.iter().map(String::as_str).collect();
        let b_refs: Vec<&str> = b.iter().map(String::as_str).collect();
        let src = doc_with(&a_refs);
        let dst = doc_with(&b_refs);

        let expected: BTreeSet<String> = a.difference(&b).cloned().collect();
        prop_assert_eq!(missing_snapshots(&src, &dst), expected.clone());

        let diff = compare_locations(&src, &dst);
        prop_assert_eq!(diff.missing_at_destination, expected);
        prop_assert_eq!(diff.in_both, a.intersection(&b).count());
    }
}
