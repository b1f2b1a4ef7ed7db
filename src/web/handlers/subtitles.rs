//! Subtitle management endpoints

use axum::{
    extract::{multipart::MultipartError, Multipart, Path, State},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::errors::{AppResult, WebError};
use crate::models::{MediaIdentifier, SubtitleRecord};
use crate::services::SubtitleUpload;
use crate::web::{
    responses::{created, handle_error, handle_result, ok, ApiResponse},
    AppState,
};

/// A stored subtitle with its public download link
#[derive(Debug, Clone, Serialize)]
pub struct SubtitleView {
    #[serde(flatten)]
    pub record: SubtitleRecord,
    pub url: String,
}

impl SubtitleView {
    fn new(record: SubtitleRecord, base_url: &str) -> Self {
        let url = record.download_url(base_url);
        Self { record, url }
    }
}

pub async fn list_subtitles(State(state): State<AppState>) -> impl IntoResponse {
    let base_url = state.coordinator.base_url();
    let views: Vec<SubtitleView> = state
        .coordinator
        .subtitles()
        .list()
        .await
        .into_iter()
        .map(|record| SubtitleView::new(record, base_url))
        .collect();
    ok(views)
}

/// Multipart upload with fields `file`, `identifier` and optional `label`
pub async fn upload_subtitle(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut identifier: Option<String> = None;
    let mut label: Option<String> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return multipart_error(e),
        };

        match field.name() {
            Some("file") => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let data = match field.bytes().await {
                    Ok(data) => data,
                    Err(e) => return multipart_error(e),
                };
                file = Some((file_name, data.to_vec()));
            }
            Some("identifier") => match field.text().await {
                Ok(text) => identifier = Some(text.trim().to_string()),
                Err(e) => return multipart_error(e),
            },
            Some("label") => match field.text().await {
                Ok(text) => label = Some(text.trim().to_string()).filter(|l| !l.is_empty()),
                Err(e) => return multipart_error(e),
            },
            _ => {}
        }
    }

    let result = store_upload(&state, file, identifier, label).await;
    match result {
        Ok(record) => {
            created(SubtitleView::new(record, state.coordinator.base_url())).into_response()
        }
        Err(e) => handle_error(e),
    }
}

async fn store_upload(
    state: &AppState,
    file: Option<(String, Vec<u8>)>,
    identifier: Option<String>,
    label: Option<String>,
) -> AppResult<SubtitleRecord> {
    let (original_name, data) =
        file.ok_or_else(|| WebError::invalid_request("file", "a subtitle file is required"))?;
    let identifier = identifier
        .filter(|id| !id.is_empty())
        .ok_or_else(|| WebError::invalid_request("identifier", "identifier is required"))?;

    let max_size = state.config.web.max_upload_bytes;
    if data.len() > max_size {
        return Err(WebError::PayloadTooLarge {
            size: data.len(),
            max_size,
        }
        .into());
    }

    let subtitles = &state.config.subtitles;
    state
        .coordinator
        .subtitles()
        .save_upload(SubtitleUpload {
            identifier: MediaIdentifier::parse(identifier),
            original_name,
            label: label.unwrap_or_else(|| subtitles.default_label.clone()),
            language: subtitles.language.clone(),
            data,
        })
        .await
}

fn multipart_error(error: MultipartError) -> Response {
    (
        error.status(),
        Json(ApiResponse::<()>::error(error.body_text())),
    )
        .into_response()
}

pub async fn delete_subtitle(State(state): State<AppState>, Path(id): Path<Uuid>) -> Response {
    handle_result(state.coordinator.subtitles().remove(id).await)
}
