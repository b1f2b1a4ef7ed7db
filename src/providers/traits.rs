//! Metadata provider trait definitions
//!
//! Providers normalize heterogeneous upstream payloads into
//! [`ProviderMeta`]; the resolver only ever sees this common shape.

use async_trait::async_trait;

use crate::errors::ProviderResult;
use crate::models::{MediaIdentifier, MediaKind, ProviderKind};

/// One metadata lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    /// Namespaced main id, e.g. `tt0944947` or `kitsu:1376`
    pub main_id: String,
    pub media_kind: MediaKind,
    pub season: Option<u32>,
    pub episode: Option<u32>,
}

impl FetchRequest {
    pub fn for_identifier(identifier: &MediaIdentifier, media_kind: MediaKind) -> Self {
        Self {
            main_id: identifier.main_id().to_string(),
            media_kind,
            season: identifier.season(),
            episode: identifier.episode(),
        }
    }
}

/// Per-episode record as reported by a provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpisodeRecord {
    pub season: Option<u32>,
    pub number: u32,
    pub title: Option<String>,
    pub thumbnail: Option<String>,
}

/// Normalized provider answer
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderMeta {
    pub name: String,
    pub poster: Option<String>,
    /// Catalog providers return every known episode, the anime provider
    /// at most the one that was asked for
    pub episodes: Vec<EpisodeRecord>,
}

/// A source of titles and posters
#[async_trait]
pub trait MetadataProvider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    /// Whether this provider can look up the given identifier at all
    fn supports(&self, identifier: &MediaIdentifier) -> bool;

    /// Single time-bounded lookup. Never panics; every failure is an error value.
    async fn fetch(&self, request: &FetchRequest) -> ProviderResult<ProviderMeta>;
}
