//! Identifier → display metadata resolution
//!
//! The provider owning the identifier's namespace is asked first, then the
//! remaining providers in configured order. The first usable name wins.
//! When every provider fails the result carries the raw identifier and the
//! placeholder poster; resolution itself never fails.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::models::{MediaIdentifier, MediaKind, Placeholder, ResolvedMeta};
use crate::providers::{EpisodeRecord, FetchRequest, MetadataProvider, ProviderMeta};

pub struct Resolver {
    /// Fallback order
    providers: Vec<Arc<dyn MetadataProvider>>,
    placeholder: Placeholder,
}

impl Resolver {
    pub fn new(providers: Vec<Arc<dyn MetadataProvider>>, placeholder: Placeholder) -> Self {
        Self {
            providers,
            placeholder,
        }
    }

    pub fn placeholder(&self) -> &Placeholder {
        &self.placeholder
    }

    /// Providers to try for an identifier, primary first
    fn candidates(&self, identifier: &MediaIdentifier) -> Vec<&Arc<dyn MetadataProvider>> {
        let owner = identifier.provider_kind();
        let supporting = self.providers.iter().filter(|p| p.supports(identifier));

        let (mut ordered, rest): (Vec<_>, Vec<_>) = supporting.partition(|p| p.kind() == owner);
        ordered.extend(rest);
        ordered
    }

    pub async fn resolve(&self, media_kind: MediaKind, identifier: &MediaIdentifier) -> ResolvedMeta {
        let request = FetchRequest::for_identifier(identifier, media_kind);

        for provider in self.candidates(identifier) {
            match provider.fetch(&request).await {
                Ok(meta) if !meta.name.trim().is_empty() => {
                    let (display_name, image_url) = self.extract(media_kind, identifier, meta);
                    info!(
                        "Resolved {} via {} provider: {}",
                        identifier,
                        provider.kind(),
                        display_name
                    );
                    return ResolvedMeta::resolved(
                        identifier.clone(),
                        media_kind,
                        display_name,
                        image_url,
                    );
                }
                Ok(_) => debug!(
                    "{} provider returned an empty name for {}",
                    provider.kind(),
                    identifier
                ),
                Err(e) => warn!(
                    "{} provider failed for {}: {}",
                    provider.kind(),
                    identifier,
                    e
                ),
            }
        }

        warn!("No provider could resolve {}, using placeholder", identifier);
        self.placeholder.unresolved(identifier.clone(), media_kind)
    }

    /// Display name and image from a provider answer
    fn extract(
        &self,
        media_kind: MediaKind,
        identifier: &MediaIdentifier,
        meta: ProviderMeta,
    ) -> (String, String) {
        let base_title = meta.name.trim().to_string();
        let poster = meta
            .poster
            .unwrap_or_else(|| self.placeholder.poster_for(identifier));

        let episode = match identifier.episode() {
            Some(episode) if media_kind.is_episodic() => episode,
            _ => return (base_title, poster),
        };

        let label = episode_label(media_kind, identifier.season(), episode);
        let matched = find_episode(&meta.episodes, identifier.season(), episode);

        let mut display_name = format!("{base_title} - {label}");
        if let Some(title) = matched
            .and_then(|record| record.title.as_deref())
            .map(str::trim)
            .filter(|title| !title.is_empty() && *title != base_title)
        {
            display_name.push_str(" - ");
            display_name.push_str(title);
        }

        let image_url = matched
            .and_then(|record| record.thumbnail.clone())
            .unwrap_or(poster);

        (display_name, image_url)
    }
}

/// `S<season>E<episode>` for series, `EP<episode>` for anime or when the
/// season is unknown
pub fn episode_label(media_kind: MediaKind, season: Option<u32>, episode: u32) -> String {
    match (media_kind, season) {
        (MediaKind::Series, Some(season)) => format!("S{season}E{episode}"),
        _ => format!("EP{episode}"),
    }
}

/// First exact `(season, number)` match, else first number-only match
pub fn find_episode(
    episodes: &[EpisodeRecord],
    season: Option<u32>,
    number: u32,
) -> Option<&EpisodeRecord> {
    let exact = season.and_then(|season| {
        episodes
            .iter()
            .find(|record| record.number == number && record.season == Some(season))
    });

    exact.or_else(|| episodes.iter().find(|record| record.number == number))
}
