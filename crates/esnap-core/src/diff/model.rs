//! Diff result model.

use std::collections::BTreeSet;

/// Two-sided comparison of snapshot uuid sets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocationDiff {
    /// In source, absent from destination (what a sync must copy)
    pub missing_at_destination: BTreeSet<String>,
    /// In destination, absent from source (never touched by a sync)
    pub only_at_destination: BTreeSet<String>,
    /// Count of uuids present on both sides
    pub in_both: usize,
}

impl LocationDiff {
    /// Whether the destination already holds every source snapshot
    pub fn is_synced(&self) -> bool {
        self.missing_at_destination.is_empty()
    }
}
