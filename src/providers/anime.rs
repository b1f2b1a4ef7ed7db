//! Anime catalog provider (JSON:API style)
//!
//! Titles come from `GET {base}/anime/{id}`, episode details from
//! `GET {base}/anime/{id}/episodes?filter[number]={n}`.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, warn};

use super::traits::{EpisodeRecord, FetchRequest, MetadataProvider, ProviderMeta};
use crate::errors::{ProviderError, ProviderResult};
use crate::models::{MediaIdentifier, ProviderKind, ANIME_NAMESPACE};
use crate::utils::{trim_base_url, StandardHttpClient};

#[derive(Debug, Deserialize)]
struct AnimeEnvelope {
    data: Option<AnimeData>,
}

#[derive(Debug, Deserialize)]
struct AnimeData {
    attributes: Option<AnimeAttributes>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnimeAttributes {
    canonical_title: Option<String>,
    poster_image: Option<ImageSet>,
}

#[derive(Debug, Deserialize)]
struct ImageSet {
    medium: Option<String>,
    original: Option<String>,
}

impl ImageSet {
    fn best(self) -> Option<String> {
        self.medium
            .filter(|url| !url.is_empty())
            .or(self.original.filter(|url| !url.is_empty()))
    }
}

#[derive(Debug, Deserialize)]
struct EpisodeEnvelope {
    #[serde(default)]
    data: Vec<EpisodeData>,
}

#[derive(Debug, Deserialize)]
struct EpisodeData {
    attributes: Option<EpisodeAttributes>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EpisodeAttributes {
    canonical_title: Option<String>,
    thumbnail: Option<ThumbnailSet>,
    number: Option<u32>,
    season_number: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ThumbnailSet {
    original: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AnimeProvider {
    base_url: String,
    http: StandardHttpClient,
}

impl AnimeProvider {
    pub fn new(base_url: &str, http: StandardHttpClient) -> Self {
        Self {
            base_url: trim_base_url(base_url),
            http,
        }
    }

    /// Numeric catalog id from a `kitsu:<n>` main id
    fn catalog_id(main_id: &str) -> Option<&str> {
        let id = main_id
            .strip_prefix(ANIME_NAMESPACE)
            .and_then(|rest| rest.strip_prefix(':'))
            .unwrap_or(main_id);
        (!id.is_empty() && id.chars().all(|c| c.is_ascii_digit())).then_some(id)
    }

    fn anime_url(&self, id: &str) -> String {
        format!("{}/anime/{}", self.base_url, id)
    }

    fn episode_url(&self, id: &str, number: u32) -> String {
        format!("{}/anime/{}/episodes?filter[number]={}", self.base_url, id, number)
    }

    async fn fetch_episode(&self, id: &str, number: u32) -> ProviderResult<Option<EpisodeRecord>> {
        let url = self.episode_url(id, number);
        let envelope: EpisodeEnvelope = self.http.fetch_json(&url).await?;

        let record = envelope
            .data
            .into_iter()
            .filter_map(|episode| episode.attributes)
            .next()
            .map(|attributes| EpisodeRecord {
                season: attributes.season_number,
                number: attributes.number.unwrap_or(number),
                title: attributes.canonical_title.filter(|t| !t.trim().is_empty()),
                thumbnail: attributes
                    .thumbnail
                    .and_then(|thumbnail| thumbnail.original)
                    .filter(|url| !url.is_empty()),
            });

        Ok(record)
    }
}

#[async_trait]
impl MetadataProvider for AnimeProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Anime
    }

    fn supports(&self, identifier: &MediaIdentifier) -> bool {
        identifier.provider_kind() == ProviderKind::Anime
            && Self::catalog_id(identifier.main_id()).is_some()
    }

    async fn fetch(&self, request: &FetchRequest) -> ProviderResult<ProviderMeta> {
        let id = Self::catalog_id(&request.main_id).ok_or_else(|| {
            ProviderError::invalid_request(
                "anime",
                format!("'{}' is not an anime catalog id", request.main_id),
            )
        })?;

        let url = self.anime_url(id);
        let envelope: AnimeEnvelope = self.http.fetch_json(&url).await?;
        let attributes = envelope
            .data
            .and_then(|data| data.attributes)
            .ok_or_else(|| ProviderError::malformed(&url, "response has no data.attributes"))?;

        let name = attributes
            .canonical_title
            .filter(|title| !title.trim().is_empty())
            .ok_or_else(|| ProviderError::malformed(&url, "anime has no canonicalTitle"))?;
        let poster = attributes.poster_image.and_then(ImageSet::best);

        // A missing episode only costs the episode title and thumbnail
        let mut episodes = Vec::new();
        if let Some(number) = request.episode {
            match self.fetch_episode(id, number).await {
                Ok(Some(record)) => episodes.push(record),
                Ok(None) => debug!("Anime {} has no episode {}", id, number),
                Err(e) => warn!("Episode lookup for anime {} episode {} failed: {}", id, number, e),
            }
        }

        Ok(ProviderMeta {
            name,
            poster,
            episodes,
        })
    }
}
