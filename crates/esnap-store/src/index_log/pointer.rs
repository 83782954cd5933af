//! Generation pointer codec (`index.latest`)

use esnap_core::errors::{ExError, ExErrorKind};

use crate::errors::Result;

/// Pointer files are exactly this many bytes
pub const POINTER_LEN: usize = 8;

/// Big-endian encoding of a generation
pub fn encode_generation(generation: u64) -> [u8; POINTER_LEN] {
    generation.to_be_bytes()
}

/// Decode pointer bytes
///
/// # Errors
///
/// Returns `Serialization` unless the input is exactly eight bytes.
pub fn decode_generation(bytes: &[u8]) -> Result<u64> {
    let raw: [u8; POINTER_LEN] = bytes.try_into().map_err(|_| {
        ExError::new(ExErrorKind::Serialization)
            .with_op("decode_generation")
            .with_expected(format!("{} bytes", POINTER_LEN))
            .with_observed(format!("{} bytes", bytes.len()))
            .with_message("malformed generation pointer")
    })?;
    Ok(u64::from_be_bytes(raw))
}
