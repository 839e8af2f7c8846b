// src/models/run_state.rs

//! Persisted per-server run state.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Last-seen checksums and accumulated statistics for one server.
///
/// Keyed identically to the server's configuration but with an independent
/// lifecycle: clearing a server's filters must not reset this record,
/// otherwise unchanged historical data would be re-sent as "new".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RunState {
    /// Checksum of the extra-info text from the last processed update
    #[serde(default)]
    pub extra_checksum: String,

    /// Checksum of the substitution entries from the last processed update
    #[serde(default)]
    pub entries_checksum: String,

    /// Total substitutions seen; never decreases within a school assignment
    #[serde(default)]
    pub substitution_count: u64,

    /// Per-teacher substitution counters; never decremented
    #[serde(default)]
    pub teacher_stats: BTreeMap<String, u64>,

    /// Opaque report timestamp, passed through unchanged by the update path
    #[serde(default)]
    pub last_report: String,
}

impl RunState {
    /// Whether both checksums match the freshly computed pair.
    pub fn matches(&self, extra_checksum: &str, entries_checksum: &str) -> bool {
        self.extra_checksum == extra_checksum && self.entries_checksum == entries_checksum
    }
}
