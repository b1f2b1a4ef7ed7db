use axum::{
    extract::{Path, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::collections::HashMap;
use std::time::Duration;

use subtitle_companion::{
    config::ProvidersConfig,
    errors::ProviderError,
    models::{MediaIdentifier, MediaKind, Placeholder, ProviderKind, Resolution},
    providers::{build_providers, AnimeProvider, CatalogProvider, FetchRequest, MetadataProvider},
    services::Resolver,
    utils::StandardHttpClient,
};

async fn catalog_meta(Path((kind, id)): Path<(String, String)>) -> Response {
    match (kind.as_str(), id.as_str()) {
        ("series", "tt123.json") => Json(json!({
            "meta": {
                "name": "Show",
                "poster": "https://img/show.jpg",
                "videos": [
                    { "season": 0, "number": 2, "title": "Special" },
                    { "season": 1, "number": 2, "episode": 2, "title": "Pilot", "thumbnail": "T" },
                    { "id": "trailer-without-number" }
                ]
            }
        }))
        .into_response(),
        ("movie", "tt42.json") => Json(json!({
            "meta": { "name": "Film", "poster": "https://img/film.jpg" }
        }))
        .into_response(),
        ("movie", "tt-empty.json") => Json(json!({ "meta": {} })).into_response(),
        (_, "tt-slow.json") => {
            tokio::time::sleep(Duration::from_secs(3)).await;
            Json(json!({ "meta": { "name": "Late" } })).into_response()
        }
        _ => (StatusCode::NOT_FOUND, Json(json!({ "err": "not found" }))).into_response(),
    }
}

async fn anime(Path(id): Path<String>) -> Response {
    match id.as_str() {
        "1" => Json(json!({
            "data": {
                "id": "1",
                "attributes": {
                    "canonicalTitle": "Cowboy Bebop",
                    "posterImage": {
                        "medium": "https://img/bebop-medium.jpg",
                        "original": "https://img/bebop.jpg"
                    }
                }
            }
        }))
        .into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn anime_episodes(
    Path(id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let number = params.get("filter[number]").map(String::as_str);
    match (id.as_str(), number) {
        ("1", Some("5")) => Json(json!({
            "data": [{
                "attributes": {
                    "canonicalTitle": "Ballad of Fallen Angels",
                    "number": 5,
                    "seasonNumber": 1,
                    "thumbnail": { "original": "https://img/ep5.jpg" }
                }
            }]
        }))
        .into_response(),
        ("1", Some("99")) => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        _ => Json(json!({ "data": [] })).into_response(),
    }
}

/// Fake catalog and anime APIs on an ephemeral port
async fn spawn_fake_provider() -> String {
    let app = Router::new()
        .route("/meta/:kind/:id", get(catalog_meta))
        .route("/anime/:id", get(anime))
        .route("/anime/:id/episodes", get(anime_episodes));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

fn http(timeout: Duration) -> StandardHttpClient {
    StandardHttpClient::with_timeout(timeout).unwrap()
}

fn request(raw: &str, kind: MediaKind) -> FetchRequest {
    FetchRequest::for_identifier(&MediaIdentifier::parse(raw), kind)
}

fn placeholder() -> Placeholder {
    Placeholder::new("Fetching title...", "https://placeholder/{id}.jpg")
}

#[tokio::test]
async fn test_catalog_provider_parses_episodes() {
    let base = spawn_fake_provider().await;
    let provider = CatalogProvider::new(&base, http(Duration::from_secs(2)));

    let meta = provider
        .fetch(&request("tt123:1:2", MediaKind::Series))
        .await
        .unwrap();

    assert_eq!(meta.name, "Show");
    assert_eq!(meta.poster.as_deref(), Some("https://img/show.jpg"));
    assert_eq!(meta.episodes.len(), 2);
    assert_eq!(meta.episodes[1].title.as_deref(), Some("Pilot"));
}

#[tokio::test]
async fn test_catalog_provider_reports_status_and_malformed_answers() {
    let base = spawn_fake_provider().await;
    let provider = CatalogProvider::new(&base, http(Duration::from_secs(2)));

    let missing = provider.fetch(&request("tt404", MediaKind::Movie)).await;
    assert!(matches!(missing, Err(ProviderError::Http { status: 404, .. })));

    let empty = provider.fetch(&request("tt-empty", MediaKind::Movie)).await;
    assert!(matches!(empty, Err(ProviderError::Malformed { .. })));
}

#[tokio::test]
async fn test_slow_provider_times_out() {
    let base = spawn_fake_provider().await;
    let provider = CatalogProvider::new(&base, http(Duration::from_millis(200)));

    let result = provider.fetch(&request("tt-slow", MediaKind::Movie)).await;
    assert!(matches!(result, Err(ProviderError::Timeout { .. })));
}

#[tokio::test]
async fn test_unreachable_provider_is_unavailable() {
    let provider = CatalogProvider::new("http://127.0.0.1:9", http(Duration::from_secs(1)));

    let result = provider.fetch(&request("tt1", MediaKind::Movie)).await;
    assert!(matches!(
        result,
        Err(ProviderError::Unavailable { .. }) | Err(ProviderError::Timeout { .. })
    ));
}

#[tokio::test]
async fn test_anime_provider_fetches_episode_details() {
    let base = spawn_fake_provider().await;
    let provider = AnimeProvider::new(&base, http(Duration::from_secs(2)));

    let meta = provider
        .fetch(&request("kitsu:1:5", MediaKind::Anime))
        .await
        .unwrap();

    assert_eq!(meta.name, "Cowboy Bebop");
    assert_eq!(meta.poster.as_deref(), Some("https://img/bebop-medium.jpg"));
    assert_eq!(meta.episodes.len(), 1);
    assert_eq!(meta.episodes[0].number, 5);
    assert_eq!(meta.episodes[0].thumbnail.as_deref(), Some("https://img/ep5.jpg"));
}

#[tokio::test]
async fn test_anime_episode_failure_keeps_title() {
    let base = spawn_fake_provider().await;
    let provider = AnimeProvider::new(&base, http(Duration::from_secs(2)));

    let meta = provider
        .fetch(&request("kitsu:1:99", MediaKind::Anime))
        .await
        .unwrap();

    assert_eq!(meta.name, "Cowboy Bebop");
    assert!(meta.episodes.is_empty());
}

#[tokio::test]
async fn test_resolver_against_configured_providers() {
    let base = spawn_fake_provider().await;
    let config = ProvidersConfig {
        catalog_base_url: base.clone(),
        anime_base_url: base,
        timeout: Duration::from_secs(2),
        ..ProvidersConfig::default()
    };
    let providers = build_providers(&config).unwrap();
    assert_eq!(providers[0].kind(), ProviderKind::Catalog);
    let resolver = Resolver::new(providers, placeholder());

    let series = resolver
        .resolve(MediaKind::Series, &MediaIdentifier::parse("tt123:1:2"))
        .await;
    assert_eq!(series.display_name, "Show - S1E2 - Pilot");
    assert_eq!(series.image_url, "T");

    let anime = resolver
        .resolve(MediaKind::Anime, &MediaIdentifier::parse("kitsu:1:5"))
        .await;
    assert_eq!(anime.display_name, "Cowboy Bebop - EP5 - Ballad of Fallen Angels");
    assert_eq!(anime.image_url, "https://img/ep5.jpg");

    let movie = resolver
        .resolve(MediaKind::Movie, &MediaIdentifier::parse("tt42"))
        .await;
    assert_eq!(movie.display_name, "Film");
    assert_eq!(movie.image_url, "https://img/film.jpg");

    let unknown = resolver
        .resolve(MediaKind::Series, &MediaIdentifier::parse("tt999:1:1"))
        .await;
    assert_eq!(unknown.display_name, "tt999:1:1");
    assert_eq!(unknown.image_url, "https://placeholder/tt999.jpg");
    assert_eq!(unknown.resolution, Resolution::Unresolved);
}
