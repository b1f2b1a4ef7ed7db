//! Web layer module
//!
//! Two audiences share one router: media-center clients speaking the addon
//! protocol (`/manifest.json`, `/subtitles/...`, `/download/...`) and the
//! management API under `/api/v1`.

use anyhow::Result;
use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get},
    Router,
};
use std::net::SocketAddr;
use tokio_util::sync::CancellationToken;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::info;

use crate::{config::Config, services::LookupCoordinator};

pub mod handlers;
pub mod responses;

pub use responses::{handle_error, handle_result, ApiResponse};

/// Multipart framing allowance on top of the file size limit
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub coordinator: LookupCoordinator,
    /// Application start time for uptime calculation
    pub start_time: chrono::DateTime<chrono::Utc>,
}

impl AppState {
    pub fn new(config: Config, coordinator: LookupCoordinator) -> Self {
        Self {
            config,
            coordinator,
            start_time: chrono::Utc::now(),
        }
    }
}

/// Build the router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    let subtitle_dir = state.coordinator.subtitles().subtitle_dir().to_path_buf();
    let body_limit = state.config.web.max_upload_bytes + MULTIPART_OVERHEAD_BYTES;

    Router::new()
        .route("/health", get(handlers::health::health_check))
        // Addon protocol
        .route("/manifest.json", get(handlers::addon::manifest))
        .route(
            "/subtitles/:media_type/:id",
            get(handlers::addon::subtitles),
        )
        .route(
            "/subtitles/:media_type/:id/:extra",
            get(handlers::addon::subtitles_with_extra),
        )
        .nest_service("/download", ServeDir::new(subtitle_dir))
        // Management API
        .nest("/api/v1", api_v1_routes(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn api_v1_routes(body_limit: usize) -> Router<AppState> {
    Router::new()
        .route("/history", get(handlers::history::list_history))
        .route(
            "/subtitles",
            get(handlers::subtitles::list_subtitles)
                .post(handlers::subtitles::upload_subtitle)
                .layer(DefaultBodyLimit::max(body_limit)),
        )
        .route("/subtitles/:id", delete(handlers::subtitles::delete_subtitle))
}

/// Web server configuration and setup
pub struct WebServer {
    app: Router,
    addr: SocketAddr,
}

impl WebServer {
    pub fn new(config: Config, coordinator: LookupCoordinator) -> Result<Self> {
        let addr: SocketAddr = format!("{}:{}", config.web.host, config.web.port).parse()?;
        let app = create_router(AppState::new(config, coordinator));
        Ok(Self { app, addr })
    }

    /// Serve until the token is cancelled, then finish in-flight requests
    pub async fn serve(self, cancellation_token: CancellationToken) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(&self.addr)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", self.addr, e))?;
        info!("Web server listening on {}", self.addr);

        axum::serve(listener, self.app)
            .with_graceful_shutdown(async move {
                cancellation_token.cancelled().await;
                info!("Web server received cancellation signal, shutting down gracefully");
            })
            .await?;
        Ok(())
    }

    pub fn host(&self) -> String {
        self.addr.ip().to_string()
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }
}
