//! Catalog metadata provider
//!
//! Speaks the addon meta protocol: `GET {base}/meta/{type}/{id}.json`
//! returning `{ "meta": { "name", "poster", "videos": [...] } }`.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::traits::{EpisodeRecord, FetchRequest, MetadataProvider, ProviderMeta};
use crate::errors::{ProviderError, ProviderResult};
use crate::models::{MediaIdentifier, ProviderKind};
use crate::utils::{trim_base_url, StandardHttpClient};

#[derive(Debug, Deserialize)]
struct CatalogEnvelope {
    meta: Option<CatalogMeta>,
}

#[derive(Debug, Deserialize)]
struct CatalogMeta {
    name: Option<String>,
    poster: Option<String>,
    /// Kept untyped so one odd video entry does not sink the whole answer
    #[serde(default)]
    videos: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct CatalogVideo {
    season: Option<u32>,
    number: Option<u32>,
    episode: Option<u32>,
    title: Option<String>,
    name: Option<String>,
    thumbnail: Option<String>,
}

impl CatalogVideo {
    fn into_record(self) -> Option<EpisodeRecord> {
        let number = self.number.or(self.episode)?;
        Some(EpisodeRecord {
            season: self.season,
            number,
            title: non_empty(self.title).or_else(|| non_empty(self.name)),
            thumbnail: non_empty(self.thumbnail),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[derive(Debug, Clone)]
pub struct CatalogProvider {
    base_url: String,
    http: StandardHttpClient,
}

impl CatalogProvider {
    pub fn new(base_url: &str, http: StandardHttpClient) -> Self {
        Self {
            base_url: trim_base_url(base_url),
            http,
        }
    }

    fn meta_url(&self, request: &FetchRequest) -> String {
        format!(
            "{}/meta/{}/{}.json",
            self.base_url,
            request.media_kind.as_str(),
            urlencoding::encode(&request.main_id)
        )
    }
}

#[async_trait]
impl MetadataProvider for CatalogProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Catalog
    }

    fn supports(&self, identifier: &MediaIdentifier) -> bool {
        !identifier.is_empty()
    }

    async fn fetch(&self, request: &FetchRequest) -> ProviderResult<ProviderMeta> {
        if request.main_id.trim().is_empty() {
            return Err(ProviderError::invalid_request("catalog", "empty main id"));
        }

        let url = self.meta_url(request);
        let envelope: CatalogEnvelope = self.http.fetch_json(&url).await?;
        let meta = envelope
            .meta
            .ok_or_else(|| ProviderError::malformed(&url, "response has no meta object"))?;

        let name = non_empty(meta.name)
            .ok_or_else(|| ProviderError::malformed(&url, "meta has no name"))?;

        let episodes: Vec<EpisodeRecord> = meta
            .videos
            .into_iter()
            .filter_map(|video| serde_json::from_value::<CatalogVideo>(video).ok())
            .filter_map(CatalogVideo::into_record)
            .collect();

        debug!(
            "Catalog resolved {} to '{}' with {} episodes",
            request.main_id,
            name,
            episodes.len()
        );

        Ok(ProviderMeta {
            name,
            poster: non_empty(meta.poster),
            episodes,
        })
    }
}
