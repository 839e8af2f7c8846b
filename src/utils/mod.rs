// src/utils/mod.rs

//! Utility functions and helpers.

pub mod gates;

pub use gates::{ChannelGates, CheckGate, MAX_CONCURRENT_CHECKS};
