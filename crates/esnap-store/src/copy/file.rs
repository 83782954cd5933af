use esnap_core::FileDigest;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use crate::digest::compute_file_digest;
use crate::errors::{integrity_mismatch, io_error_at, Result};

/// What [`copy_file`] did with one destination path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyOutcome {
    /// Destination was absent; bytes were copied and the source hashed
    Copied(FileDigest),
    /// Destination already existed without a manifest entry; the source was
    /// hashed so the entry can be backfilled
    Registered(FileDigest),
    /// Destination was re-hashed and matched its manifest entry
    Verified,
    /// Destination was present with an entry and trusted without reading it
    Trusted,
}

impl CopyOutcome {
    /// The digest the caller should store in the manifest, if any
    pub fn recorded_digest(&self) -> Option<&FileDigest> {
        match self {
            CopyOutcome::Copied(d) | CopyOutcome::Registered(d) => Some(d),
            CopyOutcome::Verified | CopyOutcome::Trusted => None,
        }
    }
}

/// Bring `dst` in line with `src`.
///
/// - `dst` missing: copy, hash `src`, return [`CopyOutcome::Copied`]
/// - `dst` present, no `expected`: hash `src`, return [`CopyOutcome::Registered`]
/// - `dst` present, `expected` set, `verify`: re-hash `dst` and compare
/// - otherwise trust `dst`
///
/// # Errors
///
/// `IntegrityMismatch` naming the file when verification disagrees with
/// `expected`; `Io` when reading, copying or hashing fails. New bytes go to
/// a sibling `<name>.part` that is synced and renamed over `dst`, and removed
/// if any step fails.
pub fn copy_file(
    src: &Path,
    dst: &Path,
    expected: Option<&FileDigest>,
    verify: bool,
) -> Result<CopyOutcome> {
    if !dst.exists() {
        let digest = copy_new(src, dst)?;
        tracing::debug!(src = %src.display(), dst = %dst.display(), size = digest.size, "Copied file");
        return Ok(CopyOutcome::Copied(digest));
    }

    match expected {
        None => {
            let digest = compute_file_digest(src)?;
            tracing::debug!(dst = %dst.display(), "Registered existing file");
            Ok(CopyOutcome::Registered(digest))
        }
        Some(expected) if verify => {
            verify_file(dst, expected)?;
            tracing::debug!(dst = %dst.display(), "Verified file");
            Ok(CopyOutcome::Verified)
        }
        Some(_) => Ok(CopyOutcome::Trusted),
    }
}

/// Re-hash `path` and compare it with a recorded digest.
///
/// # Errors
///
/// `IntegrityMismatch` on a size or hash difference, `Io` if unreadable.
pub fn verify_file(path: &Path, expected: &FileDigest) -> Result<()> {
    let observed = compute_file_digest(path)?;
    if observed.size != expected.size {
        return Err(integrity_mismatch(
            path,
            "file size",
            &expected.to_string(),
            &observed.to_string(),
        ));
    }
    if observed.sha1 != expected.sha1 {
        return Err(integrity_mismatch(
            path,
            "checksum",
            &expected.to_string(),
            &observed.to_string(),
        ));
    }
    Ok(())
}

fn copy_new(src: &Path, dst: &Path) -> Result<FileDigest> {
    if let Some(parent) = dst.parent() {
        fs::create_dir_all(parent).map_err(|e| io_error_at("copy_file", parent, e))?;
    }

    // `dst` only ever appears complete; an interrupted run leaves `<name>.part`
    let part = partial_path_for(dst);
    if let Err(e) = copy_synced(src, &part) {
        remove_partial(&part);
        return Err(io_error_at("copy_file", src, e)
            .with_message(format!("failed to copy to {}", dst.display())));
    }

    let digest = match compute_file_digest(src) {
        Ok(digest) => digest,
        Err(e) => {
            remove_partial(&part);
            return Err(e);
        }
    };

    if let Err(e) = fs::rename(&part, dst) {
        remove_partial(&part);
        return Err(io_error_at("copy_file", dst, e));
    }
    Ok(digest)
}

fn copy_synced(src: &Path, part: &Path) -> std::io::Result<()> {
    fs::copy(src, part)?;
    OpenOptions::new().write(true).open(part)?.sync_all()
}

fn partial_path_for(dst: &Path) -> PathBuf {
    let mut name = dst.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".part");
    dst.with_file_name(name)
}

fn remove_partial(part: &Path) {
    if part.exists() {
        if let Err(e) = fs::remove_file(part) {
            tracing::warn!(path = %part.display(), error = %e, "Failed to remove partial copy");
        }
    }
}
