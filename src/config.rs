// src/config.rs

//! Guarded configuration service.
//!
//! Owns the settings tree behind a single async lock. All reads and
//! writes of server configuration go through this service; a deep copy
//! of the tree is taken before persistence so file I/O never holds the
//! lock.

use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::error::Result;
use crate::matching::dedup_preserving_order;
use crate::models::{Config, ServerConfig, ServerPatch};

pub struct ConfigService {
    path: PathBuf,
    inner: Mutex<Config>,
}

impl ConfigService {
    pub fn new(path: impl Into<PathBuf>, config: Config) -> Self {
        Self {
            path: path.into(),
            inner: Mutex::new(config),
        }
    }

    /// Load the configuration file, falling back to defaults.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let config = Config::load_or_default(&path);
        Self::new(path, config)
    }

    /// Deep copy of the whole settings tree.
    pub async fn snapshot(&self) -> Config {
        self.inner.lock().await.clone()
    }

    /// This server's configuration, created lazily with empty defaults.
    pub async fn server(&self, server_id: &str) -> ServerConfig {
        let mut config = self.inner.lock().await;
        config
            .servers
            .entry(server_id.to_string())
            .or_default()
            .clone()
    }

    /// Merge a partial update into a server's configuration and persist.
    ///
    /// Selected lists are appended (deduplicated, insertion order, empty
    /// strings dropped), never replaced. Assigning a different school
    /// clears both selected lists before the patch applies. Channel and
    /// school IDs only overwrite with non-empty values.
    pub async fn save_server_keys(&self, server_id: &str, patch: ServerPatch) -> Result<()> {
        let snapshot = {
            let mut config = self.inner.lock().await;
            let server = config.servers.entry(server_id.to_string()).or_default();

            if let Some(school_id) = &patch.school_id
                && !school_id.is_empty()
                && !server.school_id.is_empty()
                && *school_id != server.school_id
            {
                server.selected_classes.clear();
                server.selected_teachers.clear();
            }

            if let Some(new) = patch.selected_classes {
                server.selected_classes = merge_selection(&server.selected_classes, new);
            }
            if let Some(new) = patch.selected_teachers {
                server.selected_teachers = merge_selection(&server.selected_teachers, new);
            }

            if let Some(channel_id) = patch.channel_id
                && !channel_id.is_empty()
            {
                server.channel_id = channel_id;
            }
            if let Some(school_id) = patch.school_id
                && !school_id.is_empty()
            {
                server.school_id = school_id;
            }
            if let Some(send) = patch.send_lucky_numbers {
                server.send_lucky_numbers = send;
            }

            config.clone()
        };

        self.persist(&snapshot).await
    }

    /// Reset a server's configuration fields to empty defaults.
    ///
    /// Run state is deliberately untouched, so clearing filters does not
    /// re-send unchanged historical data as new.
    pub async fn clear_filters(&self, server_id: &str) -> Result<()> {
        let snapshot = {
            let mut config = self.inner.lock().await;
            config
                .servers
                .insert(server_id.to_string(), ServerConfig::default());
            config.clone()
        };

        self.persist(&snapshot).await
    }

    /// Write a snapshot to disk atomically (tmp file, then rename).
    async fn persist(&self, snapshot: &Config) -> Result<()> {
        let content = toml::to_string_pretty(snapshot)?;
        write_atomic(&self.path, content.as_bytes()).await
    }
}

async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let tmp = path.with_extension("tmp");
    let mut file = tokio::fs::File::create(&tmp).await?;
    file.write_all(bytes).await?;
    file.flush().await?;
    drop(file);

    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

fn merge_selection(existing: &[String], new: Vec<String>) -> Vec<String> {
    let mut merged = existing.to_vec();
    merged.extend(new.into_iter().filter(|s| !s.is_empty()));
    dedup_preserving_order(merged)
}
