use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::errors::{AppError, AppResult};
use crate::models::ProviderKind;

pub mod defaults;
pub mod duration_serde;

use defaults::*;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub web: WebConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub history: HistoryConfig,
    #[serde(default)]
    pub resolution: ResolutionConfig,
    #[serde(default)]
    pub subtitles: SubtitlesConfig,
    #[serde(default)]
    pub addon: AddonConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Public URL clients reach the service at; download links are built from it
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the history and subtitle snapshots
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Directory uploaded subtitle files are written to and served from
    #[serde(default = "default_subtitle_dir")]
    pub subtitle_dir: PathBuf,
    #[serde(default = "default_snapshot_interval", with = "duration_serde::duration")]
    pub snapshot_interval: Duration,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvidersConfig {
    #[serde(default = "default_catalog_base_url")]
    pub catalog_base_url: String,
    #[serde(default = "default_anime_base_url")]
    pub anime_base_url: String,
    /// Per-request timeout for every provider call
    #[serde(default = "default_provider_timeout", with = "duration_serde::duration")]
    pub timeout: Duration,
    /// Fallback order. The provider owning an identifier's namespace is
    /// always tried first; the rest follow in this order.
    #[serde(default = "default_provider_order")]
    pub order: Vec<ProviderKind>,
    /// Fallback poster, `{id}` is replaced by the main id
    #[serde(default = "default_placeholder_poster_url")]
    pub placeholder_poster_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    #[serde(default = "default_history_capacity")]
    pub capacity: usize,
    /// Name shown while an entry is waiting for resolution
    #[serde(default = "default_pending_label")]
    pub pending_label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolutionConfig {
    /// Pending jobs beyond this are dropped instead of blocking lookups
    #[serde(default = "default_resolution_queue_size")]
    pub queue_size: usize,
    #[serde(default = "default_resolution_max_concurrent")]
    pub max_concurrent: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubtitlesConfig {
    #[serde(default = "default_subtitle_language")]
    pub language: String,
    #[serde(default = "default_subtitle_label")]
    pub default_label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddonConfig {
    #[serde(default = "default_addon_id")]
    pub id: String,
    #[serde(default = "default_addon_name")]
    pub name: String,
    #[serde(default = "default_addon_description")]
    pub description: String,
}

// Web defaults
fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_max_upload_bytes() -> usize {
    DEFAULT_MAX_UPLOAD_BYTES
}

// Storage defaults
fn default_data_dir() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_DIR)
}

fn default_subtitle_dir() -> PathBuf {
    PathBuf::from(DEFAULT_SUBTITLE_DIR)
}

fn default_snapshot_interval() -> Duration {
    Duration::from_secs(DEFAULT_SNAPSHOT_INTERVAL_SECS)
}

// Provider defaults
fn default_catalog_base_url() -> String {
    DEFAULT_CATALOG_BASE_URL.to_string()
}

fn default_anime_base_url() -> String {
    DEFAULT_ANIME_BASE_URL.to_string()
}

fn default_provider_timeout() -> Duration {
    Duration::from_secs(DEFAULT_PROVIDER_TIMEOUT_SECS)
}

fn default_provider_order() -> Vec<ProviderKind> {
    vec![ProviderKind::Catalog, ProviderKind::Anime]
}

fn default_placeholder_poster_url() -> String {
    DEFAULT_PLACEHOLDER_POSTER_URL.to_string()
}

// History defaults
fn default_history_capacity() -> usize {
    DEFAULT_HISTORY_CAPACITY
}

fn default_pending_label() -> String {
    DEFAULT_PENDING_LABEL.to_string()
}

// Resolution defaults
fn default_resolution_queue_size() -> usize {
    DEFAULT_RESOLUTION_QUEUE_SIZE
}

fn default_resolution_max_concurrent() -> usize {
    DEFAULT_RESOLUTION_MAX_CONCURRENT
}

// Subtitle defaults
fn default_subtitle_language() -> String {
    DEFAULT_SUBTITLE_LANGUAGE.to_string()
}

fn default_subtitle_label() -> String {
    DEFAULT_SUBTITLE_LABEL.to_string()
}

// Addon defaults
fn default_addon_id() -> String {
    DEFAULT_ADDON_ID.to_string()
}

fn default_addon_name() -> String {
    DEFAULT_ADDON_NAME.to_string()
}

fn default_addon_description() -> String {
    DEFAULT_ADDON_DESCRIPTION.to_string()
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            base_url: default_base_url(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            subtitle_dir: default_subtitle_dir(),
            snapshot_interval: default_snapshot_interval(),
        }
    }
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            catalog_base_url: default_catalog_base_url(),
            anime_base_url: default_anime_base_url(),
            timeout: default_provider_timeout(),
            order: default_provider_order(),
            placeholder_poster_url: default_placeholder_poster_url(),
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: default_history_capacity(),
            pending_label: default_pending_label(),
        }
    }
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        Self {
            queue_size: default_resolution_queue_size(),
            max_concurrent: default_resolution_max_concurrent(),
        }
    }
}

impl Default for SubtitlesConfig {
    fn default() -> Self {
        Self {
            language: default_subtitle_language(),
            default_label: default_subtitle_label(),
        }
    }
}

impl Default for AddonConfig {
    fn default() -> Self {
        Self {
            id: default_addon_id(),
            name: default_addon_name(),
            description: default_addon_description(),
        }
    }
}

impl StorageConfig {
    pub fn history_snapshot_path(&self) -> PathBuf {
        self.data_dir.join(HISTORY_SNAPSHOT_FILE)
    }

    pub fn subtitle_snapshot_path(&self) -> PathBuf {
        self.data_dir.join(SUBTITLE_SNAPSHOT_FILE)
    }
}

impl Config {
    /// Read `config_file`, writing a default one first if it does not exist
    pub fn load_from_file(config_file: &str) -> Result<Self> {
        let config = if Path::new(config_file).exists() {
            let contents = std::fs::read_to_string(config_file)?;
            toml::from_str::<Self>(&contents)?
        } else {
            let default_config = Self::default();
            let contents = toml::to_string_pretty(&default_config)?;
            std::fs::write(config_file, contents)?;
            info!("Created default config file: {}", config_file);
            default_config
        };

        config.validate()?;
        Ok(config)
    }

    /// Reject values the services cannot run with
    pub fn validate(&self) -> AppResult<()> {
        if self.history.capacity == 0 {
            return Err(AppError::configuration("history.capacity must be at least 1"));
        }
        if self.providers.order.is_empty() {
            return Err(AppError::configuration(
                "providers.order must name at least one provider",
            ));
        }
        if self.resolution.queue_size == 0 || self.resolution.max_concurrent == 0 {
            return Err(AppError::configuration(
                "resolution.queue_size and resolution.max_concurrent must be at least 1",
            ));
        }
        if self.providers.timeout.is_zero() {
            return Err(AppError::configuration("providers.timeout must be positive"));
        }
        if self.storage.snapshot_interval.is_zero() {
            return Err(AppError::configuration(
                "storage.snapshot_interval must be positive",
            ));
        }

        for (field, value) in [
            ("web.base_url", &self.web.base_url),
            ("providers.catalog_base_url", &self.providers.catalog_base_url),
            ("providers.anime_base_url", &self.providers.anime_base_url),
        ] {
            url::Url::parse(value).map_err(|e| {
                AppError::configuration(format!("{field} is not a valid URL ('{value}'): {e}"))
            })?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.history.capacity, 20);
        assert_eq!(config.providers.timeout, Duration::from_secs(5));
        assert_eq!(
            config.providers.order,
            vec![ProviderKind::Catalog, ProviderKind::Anime]
        );
    }

    #[test]
    fn test_partial_file_falls_back_to_defaults() {
        let config: Config = toml::from_str(
            r#"
            [history]
            capacity = 5

            [providers]
            timeout = "2s"
            order = ["anime", "catalog"]
            "#,
        )
        .unwrap();

        assert_eq!(config.history.capacity, 5);
        assert_eq!(config.history.pending_label, DEFAULT_PENDING_LABEL);
        assert_eq!(config.providers.timeout, Duration::from_secs(2));
        assert_eq!(config.providers.order[0], ProviderKind::Anime);
        assert_eq!(config.web.port, DEFAULT_PORT);
    }

    #[test]
    fn test_validation_rejects_zero_capacity() {
        let mut config = Config::default();
        config.history.capacity = 0;
        assert!(matches!(
            config.validate(),
            Err(AppError::Configuration { .. })
        ));
    }

    #[test]
    fn test_validation_rejects_zero_snapshot_interval() {
        let config: Config = toml::from_str(
            r#"
            [storage]
            snapshot_interval = "0s"
            "#,
        )
        .unwrap();
        assert!(matches!(
            config.validate(),
            Err(AppError::Configuration { .. })
        ));

        let config: Config = toml::from_str("[storage]\nsnapshot_interval = 0").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_bad_urls() {
        let mut config = Config::default();
        config.providers.catalog_base_url = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let path_str = path.to_str().unwrap();

        let config = Config::load_from_file(path_str).unwrap();
        assert!(path.exists());
        assert_eq!(config.web.port, DEFAULT_PORT);

        let reloaded = Config::load_from_file(path_str).unwrap();
        assert_eq!(reloaded.storage.snapshot_interval, config.storage.snapshot_interval);
    }
}
