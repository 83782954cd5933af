//! esnap Engine - Orchestration layer
//!
//! Coordinates the pure core (diff, merge) with the store (index log,
//! manifests, copy) to implement whole operations: copying a snapshot
//! between Locations, syncing, querying and verifying, plus the
//! backup-service collaborator used to trigger new snapshots.

pub mod commands;
pub mod service;
