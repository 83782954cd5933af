use esnap_core::errors::{ExError, ExErrorKind};
use esnap_core::ChecksumManifest;
use std::fs;
use std::path::{Component, Path};
use walkdir::WalkDir;

use super::file::{copy_file, CopyOutcome};
use crate::errors::{io_error_at, not_found, Result};

/// Counters for one copy run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CopyStats {
    pub files_copied: u64,
    pub files_registered: u64,
    pub files_verified: u64,
    pub files_trusted: u64,
    pub bytes_copied: u64,
}

impl CopyStats {
    pub fn record(&mut self, outcome: &CopyOutcome) {
        match outcome {
            CopyOutcome::Copied(digest) => {
                self.files_copied += 1;
                self.bytes_copied += digest.size;
            }
            CopyOutcome::Registered(_) => self.files_registered += 1,
            CopyOutcome::Verified => self.files_verified += 1,
            CopyOutcome::Trusted => self.files_trusted += 1,
        }
    }

    pub fn merge(&mut self, other: &CopyStats) {
        self.files_copied += other.files_copied;
        self.files_registered += other.files_registered;
        self.files_verified += other.files_verified;
        self.files_trusted += other.files_trusted;
        self.bytes_copied += other.bytes_copied;
    }

    /// Every file looked at, whatever happened to it
    pub fn files_seen(&self) -> u64 {
        self.files_copied + self.files_registered + self.files_verified + self.files_trusted
    }
}

/// Copy one file identified by its manifest key and record its digest.
///
/// # Errors
///
/// Anything [`copy_file`] returns.
pub fn copy_tracked(
    src_root: &Path,
    dst_root: &Path,
    key: &str,
    manifest: &mut ChecksumManifest,
    verify: bool,
    stats: &mut CopyStats,
) -> Result<()> {
    let src = join_key(src_root, key);
    let dst = join_key(dst_root, key);
    let outcome = copy_file(&src, &dst, manifest.get(key), verify)?;
    if let Some(digest) = outcome.recorded_digest() {
        manifest.insert(key, digest.clone());
    }
    stats.record(&outcome);
    Ok(())
}

/// Mirror `src_root/<relative_subpath>` into `dst_root/<relative_subpath>`.
///
/// Files are visited in sorted order. Each file's manifest key is its
/// `/`-separated path relative to the root. Directories are recreated even
/// when empty.
///
/// # Errors
///
/// `NotFound` if the source subtree is missing, `IntegrityMismatch` or `Io`
/// from the first file that fails. Entries for files handled before the
/// failure stay in `manifest`.
pub fn copy_tree(
    src_root: &Path,
    dst_root: &Path,
    relative_subpath: &str,
    manifest: &mut ChecksumManifest,
    verify: bool,
) -> Result<CopyStats> {
    let src_dir = join_key(src_root, relative_subpath);
    if !src_dir.is_dir() {
        return Err(not_found("copy_tree", &src_dir, "source folder"));
    }

    let mut stats = CopyStats::default();
    for entry in WalkDir::new(&src_dir).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(src_dir.as_path()).to_path_buf();
            match e.into_io_error() {
                Some(io) => io_error_at("copy_tree", &path, io),
                None => ExError::new(ExErrorKind::Io)
                    .with_op("copy_tree")
                    .with_path(path.display().to_string())
                    .with_message("filesystem loop detected"),
            }
        })?;

        let relative = entry.path().strip_prefix(&src_dir).map_err(|_| {
            ExError::new(ExErrorKind::Internal)
                .with_op("copy_tree")
                .with_path(entry.path().display().to_string())
                .with_message("walked outside the source folder")
        })?;
        let key = manifest_key(relative_subpath, relative)?;

        let file_type = entry.file_type();
        if file_type.is_dir() {
            let dst_dir = join_key(dst_root, &key);
            fs::create_dir_all(&dst_dir).map_err(|e| io_error_at("copy_tree", &dst_dir, e))?;
        } else if file_type.is_file() {
            copy_tracked(src_root, dst_root, &key, manifest, verify, &mut stats)?;
        } else {
            tracing::debug!(path = %entry.path().display(), "Skipping non-regular file");
        }
    }

    Ok(stats)
}

fn join_key(root: &Path, key: &str) -> std::path::PathBuf {
    key.split('/')
        .filter(|part| !part.is_empty())
        .fold(root.to_path_buf(), |path, part| path.join(part))
}

fn manifest_key(base: &str, relative: &Path) -> Result<String> {
    let mut key = base.trim_end_matches('/').to_string();
    for component in relative.components() {
        if let Component::Normal(part) = component {
            let part = part.to_str().ok_or_else(|| {
                ExError::new(ExErrorKind::InvalidInput)
                    .with_op("copy_tree")
                    .with_path(relative.display().to_string())
                    .with_message("file name is not valid UTF-8")
            })?;
            if !key.is_empty() {
                key.push('/');
            }
            key.push_str(part);
        }
    }
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use esnap_core::FileDigest;
    use tempfile::TempDir;

    fn write(root: &Path, key: &str, content: &[u8]) {
        let path = join_key(root, key);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_manifest_key_uses_forward_slashes() {
        let key = manifest_key("indices/folderA", Path::new("0").join("__abc").as_path()).unwrap();
        assert_eq!(key, "indices/folderA/0/__abc");
        assert_eq!(manifest_key("indices/folderA", Path::new("")).unwrap(), "indices/folderA");
    }

    #[test]
    fn test_tree_copy_accumulates_manifest() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        write(src.path(), "indices/folderA/meta-x.dat", b"one");
        write(src.path(), "indices/folderA/0/__a", b"two");
        write(src.path(), "indices/folderA/0/__b", b"three");

        // Already copied and recorded by an earlier snapshot run
        write(dst.path(), "indices/folderA/0/__a", b"two");
        let mut manifest = ChecksumManifest::new();
        manifest.insert(
            "indices/folderA/0/__a",
            FileDigest {
                sha1: "ad782ecdac770fc6eb9a62e44f90873fb97fb26b".to_string(),
                size: 3,
            },
        );

        let stats = copy_tree(src.path(), dst.path(), "indices/folderA", &mut manifest, false)
            .unwrap();

        assert_eq!(stats.files_copied, 2);
        assert_eq!(stats.files_trusted, 1);
        assert_eq!(stats.bytes_copied, 8);
        assert_eq!(manifest.len(), 3);
        assert!(manifest.contains("indices/folderA/meta-x.dat"));
        assert!(manifest.contains("indices/folderA/0/__b"));
        assert_eq!(
            fs::read(dst.path().join("indices/folderA/0/__b")).unwrap(),
            b"three"
        );
    }

    #[test]
    fn test_empty_directories_are_recreated() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        fs::create_dir_all(src.path().join("indices/folderA/1")).unwrap();

        let mut manifest = ChecksumManifest::new();
        let stats = copy_tree(src.path(), dst.path(), "indices/folderA", &mut manifest, false)
            .unwrap();

        assert_eq!(stats.files_seen(), 0);
        assert!(dst.path().join("indices/folderA/1").is_dir());
    }

    #[test]
    fn test_missing_source_folder_is_not_found() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        let mut manifest = ChecksumManifest::new();

        let err = copy_tree(src.path(), dst.path(), "indices/nope", &mut manifest, false)
            .unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::NotFound);
    }

    #[test]
    fn test_verify_stops_at_corrupted_file() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        write(src.path(), "indices/folderA/0/__a", b"abc");

        let mut manifest = ChecksumManifest::new();
        copy_tree(src.path(), dst.path(), "indices/folderA", &mut manifest, false).unwrap();
        write(dst.path(), "indices/folderA/0/__a", b"abd");

        let err = copy_tree(src.path(), dst.path(), "indices/folderA", &mut manifest, true)
            .unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::IntegrityMismatch);
    }
}
