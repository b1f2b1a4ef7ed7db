//! External metadata providers
//!
//! - [`CatalogProvider`]: addon-style catalog keyed by namespaced ids
//! - [`AnimeProvider`]: anime catalog keyed by numeric `kitsu:` ids

use std::sync::Arc;

use crate::config::ProvidersConfig;
use crate::errors::AppResult;
use crate::models::ProviderKind;
use crate::utils::StandardHttpClient;

pub mod anime;
pub mod catalog;
pub mod traits;

pub use anime::AnimeProvider;
pub use catalog::CatalogProvider;
pub use traits::{EpisodeRecord, FetchRequest, MetadataProvider, ProviderMeta};

/// Build the configured providers in fallback order, skipping repeats
pub fn build_providers(config: &ProvidersConfig) -> AppResult<Vec<Arc<dyn MetadataProvider>>> {
    let http = StandardHttpClient::with_timeout(config.timeout)?;
    let mut providers: Vec<Arc<dyn MetadataProvider>> = Vec::new();

    for kind in &config.order {
        if providers.iter().any(|p| p.kind() == *kind) {
            continue;
        }
        let provider: Arc<dyn MetadataProvider> = match kind {
            ProviderKind::Catalog => {
                Arc::new(CatalogProvider::new(&config.catalog_base_url, http.clone()))
            }
            ProviderKind::Anime => Arc::new(AnimeProvider::new(&config.anime_base_url, http.clone())),
        };
        providers.push(provider);
    }

    Ok(providers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_providers_follows_order_without_duplicates() {
        let config = ProvidersConfig {
            order: vec![ProviderKind::Anime, ProviderKind::Catalog, ProviderKind::Anime],
            ..ProvidersConfig::default()
        };
        let kinds: Vec<ProviderKind> = build_providers(&config)
            .unwrap()
            .iter()
            .map(|p| p.kind())
            .collect();
        assert_eq!(kinds, vec![ProviderKind::Anime, ProviderKind::Catalog]);
    }
}
