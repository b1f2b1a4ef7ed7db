//! Addon protocol endpoints
//!
//! Media-center clients fetch the manifest once, then call the subtitle
//! route for every title they play. Both answer in the addon wire shape.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{MediaIdentifier, MediaKind, SubtitleDescriptor, ANIME_NAMESPACE};
use crate::web::AppState;

/// Addon manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddonManifest {
    pub id: String,
    pub version: String,
    pub name: String,
    pub description: String,
    pub resources: Vec<String>,
    pub types: Vec<MediaKind>,
    pub id_prefixes: Vec<String>,
    pub catalogs: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubtitlesResponse {
    pub subtitles: Vec<SubtitleDescriptor>,
}

pub async fn manifest(State(state): State<AppState>) -> Json<AddonManifest> {
    let addon = &state.config.addon;
    Json(AddonManifest {
        id: addon.id.clone(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        name: addon.name.clone(),
        description: addon.description.clone(),
        resources: vec!["subtitles".to_string()],
        types: vec![MediaKind::Movie, MediaKind::Series, MediaKind::Anime],
        id_prefixes: vec!["tt".to_string(), ANIME_NAMESPACE.to_string()],
        catalogs: Vec::new(),
    })
}

/// `GET /subtitles/:media_type/:id.json`
pub async fn subtitles(
    State(state): State<AppState>,
    Path((media_type, id)): Path<(String, String)>,
) -> Json<SubtitlesResponse> {
    lookup(&state, &media_type, &id).await
}

/// `GET /subtitles/:media_type/:id/:extra.json`; the extra segment carries
/// client hints that do not affect the answer
pub async fn subtitles_with_extra(
    State(state): State<AppState>,
    Path((media_type, id, _extra)): Path<(String, String, String)>,
) -> Json<SubtitlesResponse> {
    lookup(&state, &media_type, &id).await
}

async fn lookup(state: &AppState, media_type: &str, id: &str) -> Json<SubtitlesResponse> {
    let raw = id.strip_suffix(".json").unwrap_or(id);
    let identifier = MediaIdentifier::parse(raw);

    let media_kind = match media_type.parse::<MediaKind>() {
        Ok(kind) if !identifier.is_empty() => kind,
        _ => {
            debug!("Ignoring subtitle request for {}/{}", media_type, raw);
            return Json(SubtitlesResponse {
                subtitles: Vec::new(),
            });
        }
    };

    let subtitles = state.coordinator.handle_lookup(media_kind, &identifier).await;
    Json(SubtitlesResponse { subtitles })
}
