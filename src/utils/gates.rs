// src/utils/gates.rs

//! Concurrency guards for server checks and channel-directed operations.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedSemaphorePermit, Semaphore};

/// System-wide bound on simultaneous per-server checks.
pub const MAX_CONCURRENT_CHECKS: usize = 3;

/// Counting guard bounding concurrent "check this server" operations,
/// regardless of how many schools are polled in parallel.
#[derive(Clone)]
pub struct CheckGate {
    semaphore: Arc<Semaphore>,
}

impl CheckGate {
    pub fn new(permits: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(permits)),
        }
    }

    /// Wait for a free slot. The permit releases on drop.
    pub async fn acquire(&self) -> OwnedSemaphorePermit {
        // The semaphore is never closed, so acquisition cannot fail.
        self.semaphore
            .clone()
            .acquire_owned()
            .await
            .expect("check gate semaphore closed")
    }
}

impl Default for CheckGate {
    fn default() -> Self {
        Self::new(MAX_CONCURRENT_CHECKS)
    }
}

/// Per-channel mutual exclusion for channel-directed operations.
///
/// Operations on the same channel key never interleave; distinct channels
/// proceed fully in parallel. The lock map is capacity-bounded: once it
/// grows past `capacity`, entries with no outstanding holders are swept
/// before inserting a new one, so very long uptimes cannot grow it
/// without bound.
pub struct ChannelGates {
    capacity: usize,
    locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl ChannelGates {
    pub fn new() -> Self {
        Self::with_capacity(1024)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// The lock guarding the given channel key.
    ///
    /// Callers hold the returned mutex for the duration of the
    /// channel-directed operation.
    pub async fn gate(&self, channel_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;

        if locks.len() >= self.capacity && !locks.contains_key(channel_id) {
            // Idle entries are only referenced by the map itself.
            locks.retain(|_, gate| Arc::strong_count(gate) > 1);
        }

        locks
            .entry(channel_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Number of channel keys currently tracked.
    pub async fn tracked(&self) -> usize {
        self.locks.lock().await.len()
    }
}

impl Default for ChannelGates {
    fn default() -> Self {
        Self::new()
    }
}
