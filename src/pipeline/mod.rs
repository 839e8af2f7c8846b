// src/pipeline/mod.rs

//! Update pipeline: checksum diffing, statistics and the polling loop.

pub mod check;
pub mod checksum;
pub mod poll;
pub mod stats;

pub use check::{CheckOutcome, SkipReason, check_server};
pub use checksum::{checksum_sections, checksum_text};
pub use poll::Orchestrator;
pub use stats::accumulate;
