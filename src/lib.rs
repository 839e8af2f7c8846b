// src/lib.rs

//! Zastępstwa: school substitution notifier library

pub mod config;
pub mod error;
pub mod matching;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
