//! Health check HTTP handler

use axum::{extract::State, response::IntoResponse};
use serde::{Deserialize, Serialize};

use crate::web::{responses::ok, AppState};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: i64,
    pub history_entries: usize,
    pub subtitle_count: usize,
    pub pending_resolutions: usize,
}

pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let coordinator = &state.coordinator;

    ok(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: (chrono::Utc::now() - state.start_time).num_seconds(),
        history_entries: coordinator.history_log().len().await,
        subtitle_count: coordinator.subtitles().len().await,
        pending_resolutions: coordinator.queue().in_flight_count().await,
    })
}
