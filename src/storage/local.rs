// src/storage/local.rs

//! Local filesystem run-state storage, one JSON file per server.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::RunState;
use crate::storage::RunStateStore;

/// JSON-file-backed store rooted at a data directory.
#[derive(Clone)]
pub struct LocalRunStateStore {
    root_dir: PathBuf,
}

impl LocalRunStateStore {
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    fn path(&self, server_id: &str) -> Result<PathBuf> {
        // Server IDs are numeric snowflakes; reject anything that could
        // escape the data directory.
        if server_id.is_empty() || !server_id.chars().all(|c| c.is_ascii_digit()) {
            return Err(AppError::config(format!(
                "Invalid server ID for run state: {server_id:?}"
            )));
        }
        Ok(self.root_dir.join(format!("{server_id}.json")))
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(path: &Path, bytes: &[u8]) -> Result<()> {
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
}

#[async_trait]
impl RunStateStore for LocalRunStateStore {
    async fn load(&self, server_id: &str) -> Result<RunState> {
        let path = self.path(server_id)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(RunState::default()),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    async fn save(&self, server_id: &str, state: &RunState) -> Result<()> {
        let path = self.path(server_id)?;
        let bytes = serde_json::to_vec_pretty(state)?;
        Self::write_bytes(&path, &bytes).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_record_defaults() {
        let tmp = TempDir::new().unwrap();
        let store = LocalRunStateStore::new(tmp.path());

        let state = store.load("123").await.unwrap();
        assert_eq!(state, RunState::default());
    }

    #[tokio::test]
    async fn test_round_trip() {
        let tmp = TempDir::new().unwrap();
        let store = LocalRunStateStore::new(tmp.path());

        let mut state = RunState {
            extra_checksum: "aa".into(),
            entries_checksum: "bb".into(),
            substitution_count: 7,
            last_report: "2025-09".into(),
            ..RunState::default()
        };
        state.teacher_stats.insert("Jan Kowalski".into(), 3);

        store.save("123", &state).await.unwrap();
        assert_eq!(store.load("123").await.unwrap(), state);
    }

    #[tokio::test]
    async fn test_save_replaces_whole_record() {
        let tmp = TempDir::new().unwrap();
        let store = LocalRunStateStore::new(tmp.path());

        let first = RunState {
            substitution_count: 5,
            ..RunState::default()
        };
        store.save("123", &first).await.unwrap();

        let second = RunState {
            substitution_count: 9,
            extra_checksum: "cc".into(),
            ..RunState::default()
        };
        store.save("123", &second).await.unwrap();

        assert_eq!(store.load("123").await.unwrap(), second);
    }

    #[tokio::test]
    async fn test_rejects_non_numeric_ids() {
        let tmp = TempDir::new().unwrap();
        let store = LocalRunStateStore::new(tmp.path());

        assert!(store.load("../escape").await.is_err());
        assert!(store.save("", &RunState::default()).await.is_err());
    }
}
