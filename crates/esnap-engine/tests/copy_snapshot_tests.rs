// Integration tests for copying one snapshot between Locations
// Covers: end-to-end copy, idempotence, integrity detection, conflicts,
// lookup by name

mod common;

use common::{add_snapshot, seed_generation_zero, seed_single_snapshot, tree_bytes, write_file, Fixture};
use esnap_core::{ExErrorKind, IndexRecord, MetadataDocument};
use esnap_engine::commands::copy::{copy_snapshot, copy_snapshot_by_name};
use esnap_engine::commands::query::{disk_usage, verify_snapshot};
use esnap_store::index_log::LocationLock;
use esnap_store::{checksums, index_log};
use std::fs;

#[test]
fn test_copy_snapshot_end_to_end() {
    // Given: A source with snapshot "abc" using index logs-1 in folderA, and an empty destination
    let fx = Fixture::new();
    seed_single_snapshot(&fx.src);

    // When: The snapshot is copied
    let report = copy_snapshot(&fx.src, &fx.dst, "abc", false).unwrap();

    // Then: The destination is at generation 1 with the snapshot and index records
    assert_eq!(report.generation, Some(1));
    assert!(!report.already_present);
    let (generation, doc) = index_log::read_latest(&fx.dst).unwrap();
    assert_eq!(generation, 1);
    let snapshot = doc.find_snapshot("abc").unwrap();
    assert_eq!(snapshot.name, "s1");
    assert_eq!(snapshot.state_label(), "SUCCESS");
    assert_eq!(snapshot.version.as_deref(), Some("7.10"));
    let index = doc.indices.get("logs-1").unwrap();
    assert_eq!(index.id, "folderA");
    assert_eq!(index.snapshots, vec!["abc"]);

    // And: The manifest covers both metadata files and every file under the folder
    let manifest = checksums::load(&fx.dst, "abc").unwrap();
    let keys: Vec<&str> = manifest.iter().map(|(k, _)| k.as_str()).collect();
    assert_eq!(
        keys,
        vec![
            "indices/folderA/0/__abc",
            "indices/folderA/meta-abc.dat",
            "meta-abc.dat",
            "snap-abc.dat",
        ]
    );

    // And: Disk usage is the sum of those sizes
    let expected_bytes = fs::metadata(fx.src.root().join("meta-abc.dat")).unwrap().len()
        + fs::metadata(fx.src.root().join("snap-abc.dat")).unwrap().len()
        + tree_bytes(&fx.src.root().join("indices/folderA"));
    let usage = disk_usage(&fx.dst, "abc").unwrap();
    assert_eq!(usage.total_bytes, expected_bytes);
    assert_eq!(usage.gigabytes, 0);
    assert_eq!(report.stats.files_copied, 4);
    assert_eq!(report.stats.bytes_copied, expected_bytes);
}

#[test]
fn test_copy_twice_is_idempotent() {
    // Given: A snapshot already copied once
    let fx = Fixture::new();
    seed_single_snapshot(&fx.src);
    copy_snapshot(&fx.src, &fx.dst, "abc", false).unwrap();
    let (_, before) = index_log::read_latest(&fx.dst).unwrap();

    // When: It is copied again without verification
    let report = copy_snapshot(&fx.src, &fx.dst, "abc", false).unwrap();

    // Then: Nothing was copied and no generation was appended
    assert!(report.already_present);
    assert_eq!(report.generation, None);
    assert_eq!(report.stats.files_seen(), 0);
    let (generation, after) = index_log::read_latest(&fx.dst).unwrap();
    assert_eq!(generation, 1);
    assert_eq!(before, after);
}

#[test]
fn test_verify_detects_corruption_and_keeps_manifest() {
    // Given: A copied snapshot whose segment file is then corrupted
    let fx = Fixture::new();
    seed_single_snapshot(&fx.src);
    copy_snapshot(&fx.src, &fx.dst, "abc", false).unwrap();
    let manifest_before = checksums::load(&fx.dst, "abc").unwrap();
    fs::write(fx.dst.root().join("indices/folderA/0/__abc"), b"bit rot").unwrap();

    // When: The copy is rerun with verification
    let err = copy_snapshot(&fx.src, &fx.dst, "abc", true).unwrap_err();

    // Then: It fails naming the corrupted file
    assert_eq!(err.kind(), ExErrorKind::IntegrityMismatch);
    assert!(err.path().unwrap().ends_with("__abc"));
    assert_eq!(err.snapshot_uuid(), Some("abc"));

    // And: The manifest still holds the original digest
    assert_eq!(checksums::load(&fx.dst, "abc").unwrap(), manifest_before);
    assert_eq!(index_log::latest_generation(&fx.dst).unwrap(), 1);
}

#[test]
fn test_verify_passes_on_intact_copy() {
    let fx = Fixture::new();
    seed_single_snapshot(&fx.src);
    copy_snapshot(&fx.src, &fx.dst, "abc", false).unwrap();

    let report = copy_snapshot(&fx.src, &fx.dst, "abc", true).unwrap();
    assert!(report.already_present);
    assert_eq!(report.stats.files_verified, 4);
    assert_eq!(report.generation, None);
}

#[test]
fn test_second_snapshot_sharing_folder_registers_existing_files() {
    // Given: Two snapshots of the same index, the first already copied
    let fx = Fixture::new();
    let mut doc = MetadataDocument::empty();
    add_snapshot(&fx.src, &mut doc, "u1", "first", "logs-1", "folderA");
    seed_generation_zero(&fx.src, &doc);
    copy_snapshot(&fx.src, &fx.dst, "u1", false).unwrap();

    // And: The source later gains a second snapshot in a different folder
    let mut doc2 = doc.clone();
    add_snapshot(&fx.src, &mut doc2, "u2", "second", "logs-2", "folderB");
    seed_generation_zero(&fx.src, &doc2);

    // When: The second snapshot is copied
    let report = copy_snapshot(&fx.src, &fx.dst, "u2", false).unwrap();

    // Then: Both snapshots are recorded at the destination
    assert_eq!(report.generation, Some(2));
    let (_, dst_doc) = index_log::read_latest(&fx.dst).unwrap();
    assert!(dst_doc.contains_snapshot("u1"));
    assert!(dst_doc.contains_snapshot("u2"));
    assert_eq!(dst_doc.indices.get("logs-2").unwrap().snapshots, vec!["u2"]);
}

#[test]
fn test_index_conflict_fails_before_copying() {
    // Given: The destination already maps logs-1 to another folder
    let fx = Fixture::new();
    seed_single_snapshot(&fx.src);
    let mut dst_doc = MetadataDocument::empty();
    dst_doc.indices.insert(
        "logs-1".to_string(),
        IndexRecord::new("folderZ", vec!["other".to_string()]),
    );
    seed_generation_zero(&fx.dst, &dst_doc);

    // When: The snapshot is copied
    let err = copy_snapshot(&fx.src, &fx.dst, "abc", false).unwrap_err();

    // Then: A conflict naming the index is reported and nothing moved
    assert_eq!(err.kind(), ExErrorKind::Conflict);
    assert_eq!(err.index_name(), Some("logs-1"));
    assert!(!fx.dst.root().join("meta-abc.dat").exists());
    assert_eq!(index_log::latest_generation(&fx.dst).unwrap(), 0);
}

#[test]
fn test_missing_source_file_leaves_no_generation() {
    // Given: A source whose snap file vanished
    let fx = Fixture::new();
    seed_single_snapshot(&fx.src);
    fs::remove_file(fx.src.root().join("snap-abc.dat")).unwrap();

    // When: The snapshot is copied
    let err = copy_snapshot(&fx.src, &fx.dst, "abc", false).unwrap_err();

    // Then: The copy fails, the manifest keeps progress, no generation is appended
    assert_eq!(err.kind(), ExErrorKind::Io);
    assert!(!fx.dst.root().join("snap-abc.dat").exists());
    assert_eq!(index_log::latest_generation(&fx.dst).unwrap(), 0);
    assert!(checksums::load(&fx.dst, "abc").unwrap().contains("meta-abc.dat"));

    // And: Restoring the file and retrying completes the copy
    write_file(fx.src.root(), "snap-abc.dat", b"snap of abc");
    let report = copy_snapshot(&fx.src, &fx.dst, "abc", false).unwrap();
    assert_eq!(report.generation, Some(1));
    assert_eq!(report.stats.files_trusted, 1);
}

#[test]
fn test_interrupted_file_copy_is_redone_in_full() {
    // Given: A destination holding only the partial file a killed copy leaves behind
    let fx = Fixture::new();
    seed_single_snapshot(&fx.src);
    let partial = fx.dst.root().join("indices/folderA/0/__abc.part");
    write_file(fx.dst.root(), "indices/folderA/0/__abc.part", b"data");

    // When: The snapshot is copied
    let report = copy_snapshot(&fx.src, &fx.dst, "abc", false).unwrap();

    // Then: Every file was copied rather than registered as already present
    assert_eq!(report.stats.files_copied, 4);
    assert_eq!(report.stats.files_registered, 0);
    assert!(!partial.exists());

    // And: The recorded digests match what landed on disk
    let verified = verify_snapshot(&fx.dst, "abc").unwrap();
    assert_eq!(verified.files_verified, 4);
    assert_eq!(
        fs::read(fx.dst.root().join("indices/folderA/0/__abc")).unwrap(),
        fs::read(fx.src.root().join("indices/folderA/0/__abc")).unwrap()
    );
}

#[test]
fn test_locked_destination_gets_no_generation() {
    // Given: An initialized destination whose lock is held by another writer
    let fx = Fixture::new();
    seed_single_snapshot(&fx.src);
    index_log::ensure_initialized(&fx.dst).unwrap();
    let lock = LocationLock::acquire(&fx.dst).unwrap();

    // When: The snapshot is copied
    let err = copy_snapshot(&fx.src, &fx.dst, "abc", false).unwrap_err();

    // Then: Publishing fails fast and the pointer is untouched
    assert_eq!(err.kind(), ExErrorKind::Concurrency);
    assert_eq!(index_log::latest_generation(&fx.dst).unwrap(), 0);
    assert!(checksums::exists(&fx.dst, "abc"));

    // And: Once the other writer is done, a retry publishes the snapshot
    drop(lock);
    let report = copy_snapshot(&fx.src, &fx.dst, "abc", false).unwrap();
    assert_eq!(report.generation, Some(1));
    assert_eq!(report.stats.files_trusted, 4);
}

#[test]
fn test_unknown_uuid_is_not_found() {
    let fx = Fixture::new();
    seed_single_snapshot(&fx.src);

    let err = copy_snapshot(&fx.src, &fx.dst, "nope", false).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::NotFound);
    assert_eq!(err.snapshot_uuid(), Some("nope"));
}

#[test]
fn test_copy_by_name() {
    let fx = Fixture::new();
    seed_single_snapshot(&fx.src);

    let report = copy_snapshot_by_name(&fx.src, &fx.dst, "s1", false).unwrap();
    assert_eq!(report.uuid, "abc");
    assert!(index_log::read_latest(&fx.dst).unwrap().1.contains_snapshot("abc"));

    let err = copy_snapshot_by_name(&fx.src, &fx.dst, "no-such-name", false).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::NotFound);
}
