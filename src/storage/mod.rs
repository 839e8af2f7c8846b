// src/storage/mod.rs

//! Persistence of per-server run state.

pub mod local;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::RunState;

/// Store for per-server run-state records.
///
/// `save` replaces the server's record as a whole; callers carry
/// pass-through fields (like the report timestamp) forward themselves,
/// so a write never corrupts fields it did not compute.
#[async_trait]
pub trait RunStateStore: Send + Sync {
    /// Previous run state, or an empty default when none exists.
    async fn load(&self, server_id: &str) -> Result<RunState>;

    /// Persist the complete record for this server.
    async fn save(&self, server_id: &str, state: &RunState) -> Result<()>;
}

pub use local::LocalRunStateStore;
