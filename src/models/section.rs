// src/models/section.rs

//! A titled group of substitution entries extracted from a school page.

use serde::{Deserialize, Serialize};

/// One (title, entries) pair, e.g. a class header with its substitutions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub title: String,
    pub entries: Vec<String>,
}

impl Section {
    pub fn new(title: impl Into<String>, entries: Vec<String>) -> Self {
        Self {
            title: title.into(),
            entries,
        }
    }
}
