//! Recency log endpoint

use axum::{extract::State, response::IntoResponse};

use crate::web::{responses::ok, AppState};

/// Recently looked-up titles, most recent first
pub async fn list_history(State(state): State<AppState>) -> impl IntoResponse {
    ok(state.coordinator.history().await)
}
