//! Canonical schema constants for structured logging and events
//!
//! These constants keep field names identical across every crate that logs.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";

// Entity identifiers
pub const FIELD_LOCATION: &str = "location";
pub const FIELD_SNAPSHOT_UUID: &str = "snapshot_uuid";
pub const FIELD_INDEX_NAME: &str = "index_name";
pub const FIELD_GENERATION: &str = "generation";
pub const FIELD_PATH: &str = "path";

// Transfer counters
pub const FIELD_FILES_COPIED: &str = "files_copied";
pub const FIELD_BYTES_COPIED: &str = "bytes_copied";

// Error fields
pub const FIELD_ERR_KIND: &str = "err_kind";
pub const FIELD_ERR_CODE: &str = "err_code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
