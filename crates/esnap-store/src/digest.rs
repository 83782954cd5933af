//! Streaming SHA-1 file digests

use esnap_core::FileDigest;
use sha1::{Digest, Sha1};
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

use crate::errors::{io_error_at, Result};

/// Files are hashed in blocks of this size so memory use stays flat.
pub const BLOCK_SIZE: usize = 64 * 1024;

/// SHA-1 (lowercase hex) and byte length of a file
///
/// # Errors
///
/// Returns an `Io` error if the file cannot be opened or read.
pub fn compute_file_digest(path: &Path) -> Result<FileDigest> {
    let file = File::open(path).map_err(|e| io_error_at("compute_digest", path, e))?;
    digest_reader(file).map_err(|e| io_error_at("compute_digest", path, e))
}

/// Hash everything a reader yields
pub fn digest_reader<R: Read>(mut reader: R) -> std::io::Result<FileDigest> {
    let mut hasher = Sha1::new();
    let mut buffer = vec![0u8; BLOCK_SIZE];
    let mut size = 0u64;

    loop {
        let n = match reader.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        hasher.update(&buffer[..n]);
        size += n as u64;
    }

    Ok(FileDigest {
        sha1: hex::encode(hasher.finalize()),
        size,
    })
}
