// src/models/mod.rs

//! Typed data records used across the application.

pub mod config;
pub mod run_state;
pub mod section;

pub use config::{BotConfig, Config, SchoolConfig, ServerConfig, ServerPatch};
pub use run_state::RunState;
pub use section::Section;
