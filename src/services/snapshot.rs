//! JSON snapshot files
//!
//! Files are written to a sibling temp file and renamed into place, so a
//! crash mid-write leaves the previous snapshot intact.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::recency_log::RecencyLog;
use crate::errors::{StoreError, StoreResult};
use crate::models::ResolvedMeta;

/// Read a snapshot. A missing file is `Ok(None)`.
pub async fn read_json<T: DeserializeOwned>(path: &Path) -> StoreResult<Option<T>> {
    let contents = match tokio::fs::read(path).await {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(StoreError::io(path, e)),
    };

    serde_json::from_slice(&contents)
        .map(Some)
        .map_err(|e| StoreError::serialization(path, e))
}

pub async fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> StoreResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| StoreError::io(parent, e))?;
    }

    let contents =
        serde_json::to_vec_pretty(value).map_err(|e| StoreError::serialization(path, e))?;

    let tmp_path = temp_path(path);
    tokio::fs::write(&tmp_path, contents)
        .await
        .map_err(|e| StoreError::io(&tmp_path, e))?;
    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(|e| StoreError::io(path, e))?;

    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Periodically persists the history when it changed
pub struct HistorySnapshotter {
    history: RecencyLog,
    path: PathBuf,
    last_saved: u64,
}

impl HistorySnapshotter {
    pub fn new(history: RecencyLog, path: impl Into<PathBuf>) -> Self {
        Self {
            history,
            path: path.into(),
            last_saved: 0,
        }
    }

    /// Load saved history into the log. Unreadable snapshots are logged
    /// and ignored.
    pub async fn restore(&mut self) -> usize {
        let saved = match read_json::<Vec<ResolvedMeta>>(&self.path).await {
            Ok(Some(saved)) => saved,
            Ok(None) => {
                debug!("No history snapshot at {}", self.path.display());
                return 0;
            }
            Err(e) => {
                warn!("Ignoring unreadable history snapshot: {}", e);
                return 0;
            }
        };

        let restored = self.history.restore(saved).await;
        self.last_saved = self.history.revision();
        info!(
            "Restored {} history entries from {}",
            restored,
            self.path.display()
        );
        restored
    }

    /// Write the snapshot if the history changed since the last write.
    /// Returns whether a file was written.
    pub async fn flush(&mut self) -> StoreResult<bool> {
        if self.history.revision() == self.last_saved && self.path.exists() {
            return Ok(false);
        }

        let (revision, entries) = self.history.snapshot().await;
        write_json_atomic(&self.path, &entries).await?;
        self.last_saved = revision;
        debug!(
            "Saved {} history entries to {}",
            entries.len(),
            self.path.display()
        );
        Ok(true)
    }

    pub async fn run(mut self, interval: std::time::Duration, shutdown: CancellationToken) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(e) = self.flush().await {
                        error!("Failed to save history snapshot: {}", e);
                    }
                }
                _ = shutdown.cancelled() => break,
            }
        }

        if let Err(e) = self.flush().await {
            error!("Failed to save final history snapshot: {}", e);
        }
        info!("History snapshotter stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MediaIdentifier, MediaKind, Placeholder};

    fn history() -> RecencyLog {
        RecencyLog::new(5, Placeholder::new("Fetching title...", "https://img/{id}"))
    }

    #[tokio::test]
    async fn test_missing_file_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let value: Option<Vec<String>> = read_json(&dir.path().join("absent.json")).await.unwrap();
        assert!(value.is_none());
    }

    #[tokio::test]
    async fn test_write_creates_parent_and_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("data.json");

        write_json_atomic(&path, &vec!["a", "b"]).await.unwrap();

        let value: Option<Vec<String>> = read_json(&path).await.unwrap();
        assert_eq!(value, Some(vec!["a".to_string(), "b".to_string()]));
        assert!(!temp_path(&path).exists());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_a_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        tokio::fs::write(&path, b"{not json").await.unwrap();

        let result: StoreResult<Option<Vec<String>>> = read_json(&path).await;
        assert!(matches!(result, Err(StoreError::Serialization { .. })));
    }

    #[tokio::test]
    async fn test_history_round_trips_through_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");

        let original = history();
        original
            .upsert_provisional(&MediaIdentifier::parse("tt1"), MediaKind::Movie)
            .await;
        original
            .upsert_provisional(&MediaIdentifier::parse("tt2:1:3"), MediaKind::Series)
            .await;

        let mut snapshotter = HistorySnapshotter::new(original.clone(), &path);
        assert!(snapshotter.flush().await.unwrap());
        assert!(!snapshotter.flush().await.unwrap());

        let restored = history();
        let mut loader = HistorySnapshotter::new(restored.clone(), &path);
        assert_eq!(loader.restore().await, 2);
        assert_eq!(restored.list().await, original.list().await);
    }

    #[tokio::test]
    async fn test_corrupt_history_restores_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        tokio::fs::write(&path, b"[{]").await.unwrap();

        let log = history();
        let mut snapshotter = HistorySnapshotter::new(log.clone(), &path);
        assert_eq!(snapshotter.restore().await, 0);
        assert!(log.is_empty().await);
    }
}
