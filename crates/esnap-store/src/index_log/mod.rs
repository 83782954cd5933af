//! Versioned metadata index log
//!
//! A Location's metadata is a sequence of immutable documents `index-0`,
//! `index-1`, ... plus `index.latest`, which names the current generation.
//! Appending writes `index-<g+1>` first and moves the pointer second, both via
//! temp→rename. A crash between the two leaves a complete but unreferenced
//! document, which [`recover`] adopts on the next [`ensure_initialized`].

mod lock;
mod pointer;

pub use lock::LocationLock;
pub use pointer::{decode_generation, encode_generation, POINTER_LEN};

use esnap_core::errors::{ExError, ExErrorKind};
use esnap_core::MetadataDocument;
use std::fs;
use std::io::ErrorKind;

use crate::atomic::atomic_write;
use crate::errors::{io_error_at, not_found, serialization_error, Result};
use crate::location::Location;

/// Make sure the Location exists and has a readable pointer.
///
/// A fresh directory gets an empty `index-0` and a pointer at 0. An existing
/// Location is checked for generations written past the pointer by an
/// interrupted append. Returns the current generation.
///
/// # Errors
///
/// `Io` on filesystem failures, `Concurrency` if initialization or repair is
/// needed while another writer holds the lock, `Serialization` for a
/// malformed pointer.
pub fn ensure_initialized(location: &Location) -> Result<u64> {
    fs::create_dir_all(location.root())
        .map_err(|e| io_error_at("ensure_initialized", location.root(), e))?;

    if !location.pointer_path().exists() {
        let _lock = LocationLock::acquire(location)?;
        if !location.pointer_path().exists() {
            if !location.generation_path(0).exists() {
                write_document(location, 0, &MetadataDocument::empty())?;
            }
            write_pointer(location, 0)?;
            tracing::info!(location = %location, "Initialized empty location");
        }
    }

    recover(location)?;
    latest_generation(location)
}

/// Current generation, read from `index.latest`.
///
/// # Errors
///
/// `NotFound` if the Location was never initialized, `Serialization` if the
/// pointer is not exactly eight bytes.
pub fn latest_generation(location: &Location) -> Result<u64> {
    let path = location.pointer_path();
    let bytes = fs::read(&path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => {
            not_found("latest_generation", &path, "generation pointer")
                .with_location(location.to_string())
        }
        _ => io_error_at("latest_generation", &path, e),
    })?;
    decode_generation(&bytes).map_err(|e| e.with_path(path.display().to_string()))
}

/// Read one generation's document.
///
/// # Errors
///
/// `NotFound` if `index-<generation>` is absent, `Serialization` if it is not
/// a valid metadata document.
pub fn read(location: &Location, generation: u64) -> Result<MetadataDocument> {
    let path = location.generation_path(generation);
    let bytes = fs::read(&path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => not_found("read_generation", &path, "metadata document")
            .with_location(location.to_string()),
        _ => io_error_at("read_generation", &path, e),
    })?;
    serde_json::from_slice(&bytes).map_err(|e| serialization_error("read_generation", &path, e))
}

/// Current generation together with its document
///
/// # Errors
///
/// Anything [`latest_generation`] or [`read`] returns.
pub fn read_latest(location: &Location) -> Result<(u64, MetadataDocument)> {
    let generation = latest_generation(location)?;
    let document = read(location, generation)?;
    Ok((generation, document))
}

/// Like [`read_latest`], but an uninitialized Location reads as an empty
/// generation 0 without anything being written.
///
/// # Errors
///
/// Anything [`read_latest`] returns once a pointer exists.
pub fn read_latest_or_empty(location: &Location) -> Result<(u64, MetadataDocument)> {
    if !location.pointer_path().exists() {
        return Ok((0, MetadataDocument::empty()));
    }
    read_latest(location)
}

/// Publish `document` as the next generation and return its number.
///
/// # Errors
///
/// `Concurrency` if another writer holds the lock or `index-<g+1>` already
/// exists (an unrecovered earlier append), `Io`/`Serialization` on write
/// failures. On error the pointer still names the previous generation.
pub fn append(location: &Location, document: &MetadataDocument) -> Result<u64> {
    let _lock = LocationLock::acquire(location)?;
    let current = latest_generation(location)?;
    publish_next(location, current, document)
}

/// Read-modify-append under one lock.
///
/// `update` receives the latest document and returns the one to publish.
/// No other writer can append between the read and the write, so nothing
/// published concurrently is lost.
///
/// # Errors
///
/// Anything [`append`] or [`read`] returns, or the error from `update`, in
/// which case nothing is written.
pub fn append_with<F>(location: &Location, update: F) -> Result<u64>
where
    F: FnOnce(MetadataDocument) -> Result<MetadataDocument>,
{
    let _lock = LocationLock::acquire(location)?;
    let current = latest_generation(location)?;
    let latest = read(location, current)?;
    let document = update(latest)?;
    publish_next(location, current, &document)
}

fn publish_next(location: &Location, current: u64, document: &MetadataDocument) -> Result<u64> {
    let next = current.checked_add(1).ok_or_else(|| {
        ExError::new(ExErrorKind::Internal)
            .with_op("append_generation")
            .with_location(location.to_string())
            .with_message("generation counter exhausted")
    })?;

    let path = location.generation_path(next);
    if path.exists() {
        return Err(ExError::new(ExErrorKind::Concurrency)
            .with_op("append_generation")
            .with_location(location.to_string())
            .with_path(path.display().to_string())
            .with_message("next generation already exists; it was written by another process or an interrupted append"));
    }

    write_document(location, next, document)?;
    write_pointer(location, next)?;
    tracing::debug!(location = %location, generation = next, "Appended generation");
    Ok(next)
}

/// Adopt complete generations written past the pointer.
///
/// Walks `index-<g+1>`, `index-<g+2>`, ... while each parses, then moves the
/// pointer to the last one. Returns the new generation if anything changed.
///
/// # Errors
///
/// `Concurrency` if repair is needed while the lock is held elsewhere.
pub fn recover(location: &Location) -> Result<Option<u64>> {
    let current = latest_generation(location)?;
    if !next_exists(location, current) {
        return Ok(None);
    }

    let _lock = LocationLock::acquire(location)?;
    let current = latest_generation(location)?;

    let mut adopted = current;
    while next_exists(location, adopted) {
        let candidate = adopted + 1;
        match read(location, candidate) {
            Ok(_) => adopted = candidate,
            Err(e) => {
                tracing::warn!(
                    location = %location,
                    generation = candidate,
                    error = %e,
                    "Ignoring unreadable generation past pointer"
                );
                break;
            }
        }
    }

    if adopted == current {
        return Ok(None);
    }
    write_pointer(location, adopted)?;
    tracing::warn!(
        location = %location,
        from = current,
        to = adopted,
        "Recovered generation pointer after interrupted append"
    );
    Ok(Some(adopted))
}

fn next_exists(location: &Location, generation: u64) -> bool {
    generation
        .checked_add(1)
        .map(|next| location.generation_path(next).exists())
        .unwrap_or(false)
}

fn write_document(location: &Location, generation: u64, document: &MetadataDocument) -> Result<()> {
    let path = location.generation_path(generation);
    let bytes = serde_json::to_vec(document)
        .map_err(|e| serialization_error("write_generation", &path, e))?;
    atomic_write(&path, &bytes)
}

fn write_pointer(location: &Location, generation: u64) -> Result<()> {
    atomic_write(&location.pointer_path(), &encode_generation(generation))
}
