//! Checksum manifest persistence (`checksums-<uuid>.json`)

use esnap_core::ChecksumManifest;
use std::fs;
use std::io::ErrorKind;

use crate::atomic::atomic_write;
use crate::errors::{io_error_at, not_found, serialization_error, Result};
use crate::location::{validate_component, Location};

/// Whether the snapshot has a manifest at this Location
pub fn exists(location: &Location, uuid: &str) -> bool {
    location.checksum_path(uuid).exists()
}

/// Load a manifest, treating a missing file as empty.
///
/// # Errors
///
/// `InvalidInput` for an unusable uuid, `Serialization` for a corrupt file.
pub fn load_or_empty(location: &Location, uuid: &str) -> Result<ChecksumManifest> {
    match load(location, uuid) {
        Ok(manifest) => Ok(manifest),
        Err(e) if e.kind() == esnap_core::ExErrorKind::NotFound => Ok(ChecksumManifest::new()),
        Err(e) => Err(e),
    }
}

/// Load a manifest that must exist.
///
/// # Errors
///
/// `NotFound` if the file is absent, `Serialization` if it does not parse.
pub fn load(location: &Location, uuid: &str) -> Result<ChecksumManifest> {
    validate_component("snapshot uuid", uuid)?;
    let path = location.checksum_path(uuid);
    let bytes = fs::read(&path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => not_found("load_manifest", &path, "checksum manifest")
            .with_snapshot_uuid(uuid.to_string()),
        _ => io_error_at("load_manifest", &path, e),
    })?;
    serde_json::from_slice(&bytes).map_err(|e| serialization_error("load_manifest", &path, e))
}

/// Replace the manifest atomically.
///
/// # Errors
///
/// `Io` if the file cannot be written.
pub fn save(location: &Location, uuid: &str, manifest: &ChecksumManifest) -> Result<()> {
    validate_component("snapshot uuid", uuid)?;
    let path = location.checksum_path(uuid);
    let bytes =
        serde_json::to_vec(manifest).map_err(|e| serialization_error("save_manifest", &path, e))?;
    atomic_write(&path, &bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use esnap_core::{ExErrorKind, FileDigest};
    use tempfile::TempDir;

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let location = Location::new(dir.path());
        let mut manifest = ChecksumManifest::new();
        manifest.insert(
            "meta-abc.dat",
            FileDigest {
                sha1: "a9993e364706816aba3e25717850c26c9cd0d89d".to_string(),
                size: 3,
            },
        );

        save(&location, "abc", &manifest).unwrap();
        assert!(exists(&location, "abc"));
        assert_eq!(load(&location, "abc").unwrap(), manifest);

        let raw = fs::read_to_string(location.checksum_path("abc")).unwrap();
        assert_eq!(
            raw,
            r#"{"meta-abc.dat":{"sha1":"a9993e364706816aba3e25717850c26c9cd0d89d","size":3}}"#
        );
    }

    #[test]
    fn test_missing_manifest() {
        let dir = TempDir::new().unwrap();
        let location = Location::new(dir.path());

        assert_eq!(load(&location, "nope").unwrap_err().kind(), ExErrorKind::NotFound);
        assert!(load_or_empty(&location, "nope").unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_manifest_is_serialization_error() {
        let dir = TempDir::new().unwrap();
        let location = Location::new(dir.path());
        fs::write(location.checksum_path("abc"), b"not json").unwrap();

        let err = load_or_empty(&location, "abc").unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::Serialization);
    }
}
