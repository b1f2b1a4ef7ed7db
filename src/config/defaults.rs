/// Configuration default values
///
/// This module contains all the default values for configuration options,
/// making them easily changeable in one central location.
// Web server defaults
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024; // 5MB

// Storage defaults
pub const DEFAULT_DATA_DIR: &str = "./data";
pub const DEFAULT_SUBTITLE_DIR: &str = "./subtitles";
pub const DEFAULT_SNAPSHOT_INTERVAL_SECS: u64 = 30;
pub const HISTORY_SNAPSHOT_FILE: &str = "history.json";
pub const SUBTITLE_SNAPSHOT_FILE: &str = "subtitles.json";

// Provider defaults
pub const DEFAULT_CATALOG_BASE_URL: &str = "https://v3-cinemeta.strem.io";
pub const DEFAULT_ANIME_BASE_URL: &str = "https://kitsu.io/api/edge";
pub const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_PLACEHOLDER_POSTER_URL: &str =
    "https://images.metahub.space/poster/medium/{id}/img";

// History defaults
pub const DEFAULT_HISTORY_CAPACITY: usize = 20;
pub const DEFAULT_PENDING_LABEL: &str = "Fetching title...";

// Background resolution defaults
pub const DEFAULT_RESOLUTION_QUEUE_SIZE: usize = 256;
pub const DEFAULT_RESOLUTION_MAX_CONCURRENT: usize = 4;

// Subtitle defaults
pub const DEFAULT_SUBTITLE_LANGUAGE: &str = "ara";
pub const DEFAULT_SUBTITLE_LABEL: &str = "Community subtitles";

// Addon manifest defaults
pub const DEFAULT_ADDON_ID: &str = "org.subtitle.companion";
pub const DEFAULT_ADDON_NAME: &str = "Subtitle Companion";
pub const DEFAULT_ADDON_DESCRIPTION: &str =
    "Personal subtitles with episode-aware titles and posters";
