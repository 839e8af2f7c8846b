// src/models/config.rs

//! Application configuration structures.
//!
//! The whole settings tree is deserialized into typed records at load time,
//! so downstream code never probes a dynamic map for field shapes.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Polling and HTTP behavior settings
    #[serde(default)]
    pub bot: BotConfig,

    /// Schools keyed by school ID
    #[serde(default)]
    pub schools: BTreeMap<String, SchoolConfig>,

    /// Per-server settings keyed by chat-server ID
    #[serde(default)]
    pub servers: BTreeMap<String, ServerConfig>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.bot.poll_interval_secs == 0 {
            return Err(AppError::config("bot.poll_interval_secs must be > 0"));
        }
        if self.bot.timeout_secs == 0 {
            return Err(AppError::config("bot.timeout_secs must be > 0"));
        }
        if self.schools.is_empty() {
            return Err(AppError::config("No schools defined"));
        }
        for (id, school) in &self.schools {
            if school.url.trim().is_empty() {
                log::warn!("School {} has no source URL configured", id);
            }
        }
        Ok(())
    }
}

/// Polling and HTTP behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Seconds between update-check cycles
    #[serde(default = "defaults::poll_interval")]
    pub poll_interval_secs: u64,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            poll_interval_secs: defaults::poll_interval(),
        }
    }
}

/// A school whose substitution page is polled.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SchoolConfig {
    /// Display name
    #[serde(default)]
    pub name: String,

    /// Substitution page URL; empty means the school is skipped with a warning
    #[serde(default)]
    pub url: String,

    /// Page character encoding
    #[serde(default = "defaults::encoding")]
    pub encoding: String,

    /// Class roster, grouped by year (e.g. "1" -> ["1A", "1B"])
    #[serde(default)]
    pub class_list: BTreeMap<String, Vec<String>>,

    /// Teacher roster
    #[serde(default)]
    pub teacher_list: Vec<String>,

    /// Whether the school publishes lucky numbers at all
    #[serde(default)]
    pub has_lucky_numbers: bool,

    /// Lucky numbers keyed by day in "DD.MM" form
    #[serde(default)]
    pub lucky_numbers: BTreeMap<String, Vec<u32>>,
}

impl SchoolConfig {
    /// All classes of the school, flattened across year groups.
    pub fn all_classes(&self) -> Vec<String> {
        self.class_list.values().flatten().cloned().collect()
    }

    /// Lucky numbers for a "DD.MM" day, empty when none are published.
    pub fn lucky_numbers_for(&self, day: &str) -> Vec<u32> {
        self.lucky_numbers.get(day).cloned().unwrap_or_default()
    }
}

/// Per-server settings.
///
/// Created lazily with empty defaults on first access. The selected lists
/// never contain duplicates or empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ServerConfig {
    /// Notification channel ID; empty means the server is not yet configured
    #[serde(default)]
    pub channel_id: String,

    /// School this server subscribes to
    #[serde(default)]
    pub school_id: String,

    /// Class filters, insertion order preserved
    #[serde(default)]
    pub selected_classes: Vec<String>,

    /// Teacher filters, insertion order preserved
    #[serde(default)]
    pub selected_teachers: Vec<String>,

    /// Whether lucky-number updates are sent alongside substitutions
    #[serde(default)]
    pub send_lucky_numbers: bool,
}

/// Partial update applied to a [`ServerConfig`] by `save_server_keys`.
///
/// `None` fields are left untouched; list fields are appended with
/// deduplication, scalar fields only overwrite with non-empty values.
#[derive(Debug, Clone, Default)]
pub struct ServerPatch {
    pub channel_id: Option<String>,
    pub school_id: Option<String>,
    pub selected_classes: Option<Vec<String>>,
    pub selected_teachers: Option<Vec<String>>,
    pub send_lucky_numbers: Option<bool>,
}

mod defaults {
    pub fn user_agent() -> String {
        format!("Zastepstwa/{}", env!("CARGO_PKG_VERSION"))
    }

    pub fn timeout() -> u64 {
        10
    }

    pub fn poll_interval() -> u64 {
        300
    }

    pub fn encoding() -> String {
        "iso-8859-2".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.bot.poll_interval_secs, 300);
        assert_eq!(config.bot.timeout_secs, 10);
        assert!(config.schools.is_empty());
    }

    #[test]
    fn test_validate_rejects_empty_schools() {
        let config = Config::default();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_school_parsing() {
        let toml = r#"
            [schools.zs1]
            name = "ZS1"
            url = "https://example.com/zastepstwa"
            has_lucky_numbers = true

            [schools.zs1.class_list]
            "1" = ["1A", "1B"]
            "2" = ["2A"]

            [schools.zs1.lucky_numbers]
            "03.09" = [7, 21]
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        let school = &config.schools["zs1"];

        assert_eq!(school.encoding, "iso-8859-2");
        assert_eq!(school.all_classes(), vec!["1A", "1B", "2A"]);
        assert_eq!(school.lucky_numbers_for("03.09"), vec![7, 21]);
        assert!(school.lucky_numbers_for("04.09").is_empty());
    }
}
