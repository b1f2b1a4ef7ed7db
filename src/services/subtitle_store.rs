//! Uploaded subtitle files and their records
//!
//! Records live in memory and are persisted to a JSON snapshot after every
//! change. Files sit flat in the subtitle directory, which the web layer
//! serves under `/download`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use tokio::fs;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::snapshot::{read_json, write_json_atomic};
use crate::errors::{AppError, AppResult, StoreError, StoreResult, WebError};
use crate::models::{MediaIdentifier, SubtitleRecord};

/// Accepted subtitle file extensions
pub const SUBTITLE_EXTENSIONS: &[&str] = &["srt", "vtt"];

#[derive(Clone)]
pub struct SubtitleStore {
    records: Arc<RwLock<Vec<SubtitleRecord>>>,
    subtitle_dir: PathBuf,
    /// `None` keeps records in memory only
    snapshot_path: Option<PathBuf>,
}

/// A subtitle file as received from a client
#[derive(Debug, Clone)]
pub struct SubtitleUpload {
    pub identifier: MediaIdentifier,
    pub original_name: String,
    pub label: String,
    pub language: String,
    pub data: Vec<u8>,
}

impl SubtitleStore {
    /// Load records from `snapshot_path`. A missing or unreadable snapshot
    /// starts an empty store.
    pub async fn open(subtitle_dir: impl Into<PathBuf>, snapshot_path: impl Into<PathBuf>) -> Self {
        let snapshot_path = snapshot_path.into();

        let records = match read_json::<Vec<SubtitleRecord>>(&snapshot_path).await {
            Ok(Some(records)) => {
                info!(
                    "Loaded {} subtitle records from {}",
                    records.len(),
                    snapshot_path.display()
                );
                records
            }
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("Ignoring unreadable subtitle snapshot: {}", e);
                Vec::new()
            }
        };

        Self {
            records: Arc::new(RwLock::new(records)),
            subtitle_dir: subtitle_dir.into(),
            snapshot_path: Some(snapshot_path),
        }
    }

    pub fn in_memory(subtitle_dir: impl Into<PathBuf>) -> Self {
        Self {
            records: Arc::new(RwLock::new(Vec::new())),
            subtitle_dir: subtitle_dir.into(),
            snapshot_path: None,
        }
    }

    pub fn subtitle_dir(&self) -> &Path {
        &self.subtitle_dir
    }

    pub async fn ensure_storage_dirs(&self) -> StoreResult<()> {
        fs::create_dir_all(&self.subtitle_dir)
            .await
            .map_err(|e| StoreError::io(&self.subtitle_dir, e))
    }

    /// Records whose identifier equals `identifier` exactly, in upload order
    pub async fn find_by_identifier(&self, identifier: &MediaIdentifier) -> Vec<SubtitleRecord> {
        self.records
            .read()
            .await
            .iter()
            .filter(|record| record.identifier == *identifier)
            .cloned()
            .collect()
    }

    pub async fn list(&self) -> Vec<SubtitleRecord> {
        self.records.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    pub async fn insert(&self, record: SubtitleRecord) -> StoreResult<()> {
        let mut records = self.records.write().await;
        records.push(record);
        if let Err(e) = self.persist(&records).await {
            records.pop();
            return Err(e);
        }
        Ok(())
    }

    /// Write an uploaded file into the subtitle directory and record it
    pub async fn save_upload(&self, upload: SubtitleUpload) -> AppResult<SubtitleRecord> {
        if upload.identifier.is_empty() {
            return Err(WebError::invalid_request("identifier", "identifier is required").into());
        }
        if upload.data.is_empty() {
            return Err(WebError::invalid_request("file", "file is empty").into());
        }
        let extension = subtitle_extension(&upload.original_name)?;

        self.ensure_storage_dirs().await?;
        let file_name = generate_file_name(extension);
        let file_path = self.subtitle_dir.join(&file_name);
        fs::write(&file_path, &upload.data)
            .await
            .map_err(|e| StoreError::io(&file_path, e))?;

        let record = SubtitleRecord::new(upload.identifier, file_name, upload.label, upload.language);
        if let Err(e) = self.insert(record.clone()).await {
            if let Err(cleanup) = fs::remove_file(&file_path).await {
                warn!("Failed to remove orphaned upload {}: {}", file_path.display(), cleanup);
            }
            return Err(e.into());
        }

        info!(
            "Stored subtitle {} for {} as {}",
            record.id, record.identifier, record.file_name
        );
        Ok(record)
    }

    /// Remove a record and its file
    pub async fn remove(&self, id: Uuid) -> AppResult<SubtitleRecord> {
        let mut records = self.records.write().await;
        let index = records
            .iter()
            .position(|record| record.id == id)
            .ok_or_else(|| AppError::not_found("subtitle", id.to_string()))?;

        let record = records.remove(index);
        if let Err(e) = self.persist(&records).await {
            records.insert(index, record);
            return Err(e.into());
        }
        drop(records);

        let file_path = self.subtitle_dir.join(&record.file_name);
        match fs::remove_file(&file_path).await {
            Ok(()) => debug!("Deleted subtitle file {}", file_path.display()),
            Err(e) => warn!("Could not delete subtitle file {}: {}", file_path.display(), e),
        }

        info!("Removed subtitle {} for {}", record.id, record.identifier);
        Ok(record)
    }

    async fn persist(&self, records: &[SubtitleRecord]) -> StoreResult<()> {
        match &self.snapshot_path {
            Some(path) => write_json_atomic(path, &records).await,
            None => Ok(()),
        }
    }
}

/// Lowercased extension of an accepted subtitle file name
pub fn subtitle_extension(file_name: &str) -> AppResult<&'static str> {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    SUBTITLE_EXTENSIONS
        .iter()
        .copied()
        .find(|accepted| *accepted == extension)
        .ok_or_else(|| {
            WebError::UnsupportedContentType {
                content_type: if extension.is_empty() {
                    file_name.to_string()
                } else {
                    format!(".{extension}")
                },
            }
            .into()
        })
}

/// `sub-<millis>-<random>.<ext>`
fn generate_file_name(extension: &str) -> String {
    format!(
        "sub-{}-{}.{}",
        Utc::now().timestamp_millis(),
        fastrand::u32(..1_000_000_000),
        extension
    )
}
