//! Atomic write primitives
//!
//! Uses temp→rename so readers observe either the old bytes or the new bytes,
//! never a partial file.

use crate::errors::{io_error_at, Result};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Atomically replace `target_path` with `content`
///
/// The temp file lives next to the target (`<name>.tmp`) so the rename never
/// crosses a filesystem boundary.
///
/// # Errors
///
/// Returns an `Io` error if the parent cannot be created or the temp file
/// cannot be written, synced or renamed.
pub fn atomic_write(target_path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = target_path.parent() {
        fs::create_dir_all(parent).map_err(|e| io_error_at("create_parent_dir", parent, e))?;
    }

    let temp_path = temp_path_for(target_path);
    if let Err(e) = write_synced(&temp_path, content) {
        let _ = fs::remove_file(&temp_path);
        return Err(io_error_at("write_temp", &temp_path, e));
    }

    if let Err(e) = fs::rename(&temp_path, target_path) {
        let _ = fs::remove_file(&temp_path);
        return Err(io_error_at("rename_temp", target_path, e));
    }

    Ok(())
}

fn write_synced(path: &Path, content: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(content)?;
    file.sync_all()
}

fn temp_path_for(target_path: &Path) -> PathBuf {
    let mut name = target_path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    target_path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_atomic_write() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("index-1");

        atomic_write(&target, b"hello").unwrap();

        assert_eq!(fs::read(&target).unwrap(), b"hello");
    }

    #[test]
    fn test_atomic_write_replaces_existing_content() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("index.latest");

        atomic_write(&target, &[0u8; 8]).unwrap();
        atomic_write(&target, &[0, 0, 0, 0, 0, 0, 0, 1]).unwrap();

        assert_eq!(fs::read(&target).unwrap(), vec![0, 0, 0, 0, 0, 0, 0, 1]);
    }

    #[test]
    fn test_atomic_write_creates_parent() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("subdir").join("checksums-abc.json");

        atomic_write(&target, b"{}").unwrap();

        assert_eq!(fs::read(&target).unwrap(), b"{}");
    }

    #[test]
    fn test_temp_name_keeps_full_file_name() {
        // index-1 and index-2 must not share a temp path
        let a = temp_path_for(Path::new("/r/index-1"));
        let b = temp_path_for(Path::new("/r/checksums-abc.json"));
        assert_eq!(a, PathBuf::from("/r/index-1.tmp"));
        assert_eq!(b, PathBuf::from("/r/checksums-abc.json.tmp"));
    }

    #[test]
    fn test_no_tmp_files_after_write() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("index-0");

        atomic_write(&target, b"clean").unwrap();

        let tmp_count = fs::read_dir(temp_dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.file_name()
                    .to_str()
                    .map(|s| s.ends_with(".tmp"))
                    .unwrap_or(false)
            })
            .count();

        assert_eq!(tmp_count, 0);
    }
}
