//! Command orchestration layer.
//!
//! Each public function here is one top-level operation and logs a
//! start event plus exactly one end or end_error event.

pub mod copy;
pub mod query;
pub mod remote;
pub mod sync;
