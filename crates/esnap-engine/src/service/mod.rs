//! Backup-producing service collaborator.
//!
//! The engine only needs three calls from the service: list the snapshots of
//! a repository, create one, and list live indices. [`BackupService`] is the
//! seam; [`HttpBackupService`] talks to a real cluster and tests substitute
//! an in-memory fake.

pub mod config;
pub mod http;

pub use config::ServiceConfig;
pub use http::HttpBackupService;

use esnap_store::errors::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One row of the service's snapshot listing
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RemoteSnapshot {
    /// Snapshot name as the service reports it
    pub id: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One row of the service's index listing. Counts arrive as strings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RemoteIndex {
    pub index: String,
    #[serde(default)]
    pub uuid: Option<String>,
    #[serde(default)]
    pub health: Option<String>,
    /// Replica count
    #[serde(default)]
    pub rep: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RemoteIndex {
    /// Internal indices are named with a leading dot
    pub fn is_system(&self) -> bool {
        self.index.starts_with('.')
    }

    pub fn has_no_replicas(&self) -> bool {
        self.rep.as_deref() == Some("0")
    }
}

/// Body of a create-snapshot request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateSnapshotRequest {
    /// Comma-separated index names
    pub indices: String,
    pub ignore_unavailable: bool,
    pub include_global_state: bool,
}

impl CreateSnapshotRequest {
    /// Snapshot the given indices only, skipping unavailable ones.
    pub fn for_indices<S: AsRef<str>>(indices: &[S]) -> Self {
        Self {
            indices: indices
                .iter()
                .map(|i| i.as_ref().trim())
                .filter(|i| !i.is_empty())
                .collect::<Vec<_>>()
                .join(","),
            ignore_unavailable: true,
            include_global_state: false,
        }
    }
}

/// Operations the engine needs from the backup-producing service
pub trait BackupService {
    /// Snapshots currently held by a repository
    ///
    /// # Errors
    ///
    /// `RemoteService` for transport failures or non-success responses.
    fn list_snapshots(&self, repository: &str) -> Result<Vec<RemoteSnapshot>>;

    /// Create a snapshot and wait for it to complete; returns the response body
    ///
    /// # Errors
    ///
    /// `RemoteService` for transport failures or non-success responses.
    fn create_snapshot(
        &self,
        repository: &str,
        name: &str,
        request: &CreateSnapshotRequest,
    ) -> Result<Value>;

    /// Live indices
    ///
    /// # Errors
    ///
    /// `RemoteService` for transport failures or non-success responses.
    fn list_indices(&self) -> Result<Vec<RemoteIndex>>;
}
