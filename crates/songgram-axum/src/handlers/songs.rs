//! Song handlers - submit, status and audio download.

use axum::Json;
use axum::body::Body;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use songgram_core::{JobId, JobStatusView, SongRequest};

use crate::error::HttpError;
use crate::state::AppState;

/// Browsers may cache a finished song; it never changes.
const AUDIO_CACHE_CONTROL: &str = "private, max-age=3600";

fn status_url(id: &JobId) -> String {
    format!("/api/songs/{id}")
}

fn audio_url(id: &JobId) -> String {
    format!("/api/songs/{id}/audio")
}

/// Response to an accepted song request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponse {
    pub song_id: JobId,
    pub status: &'static str,
    pub estimated_seconds: u64,
    pub status_url: String,
    pub audio_url: String,
}

/// Status of one song.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub song_id: JobId,
    #[serde(flatten)]
    pub status: JobStatusView,
    /// Present once the song is completed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
}

/// Query for the legacy status route.
#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    #[serde(rename = "songId")]
    pub song_id: Option<String>,
}

/// Submit a song request. Returns immediately; generation runs in the background.
pub async fn submit(
    State(state): State<AppState>,
    payload: Result<Json<SongRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<SubmitResponse>), HttpError> {
    let Json(request) = payload.map_err(|rejection| HttpError::BadRequest(rejection.body_text()))?;
    let receipt = state.songs.submit(request).await?;

    Ok((
        StatusCode::ACCEPTED,
        Json(SubmitResponse {
            status: "processing",
            estimated_seconds: receipt.estimated_seconds,
            status_url: status_url(&receipt.job_id),
            audio_url: audio_url(&receipt.job_id),
            song_id: receipt.job_id,
        }),
    ))
}

/// Get the status of a song.
pub async fn status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StatusResponse>, HttpError> {
    let id = JobId::from(id);
    let status = state.songs.status(&id).await?;
    let audio_url = status.is_completed().then(|| audio_url(&id));

    Ok(Json(StatusResponse {
        song_id: id,
        status,
        audio_url,
    }))
}

/// Legacy status route: `GET /api/status?songId=...`.
pub async fn status_by_query(
    state: State<AppState>,
    Query(query): Query<StatusQuery>,
) -> Result<Json<StatusResponse>, HttpError> {
    let id = query
        .song_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| HttpError::BadRequest("songId is required".to_string()))?;
    status(state, Path(id)).await
}

/// Download the finished MP3.
pub async fn audio(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, HttpError> {
    let id = JobId::from(id);
    let artifact = state.songs.fetch_audio(&id).await?;

    tracing::debug!(
        target: "songgram.http",
        song_id = %id,
        size_bytes = artifact.bytes.len(),
        "Serving song audio"
    );

    let headers = [
        (header::CONTENT_TYPE, artifact.content_type.to_string()),
        (header::CONTENT_LENGTH, artifact.bytes.len().to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", artifact.filename),
        ),
        (header::CACHE_CONTROL, AUDIO_CACHE_CONTROL.to_string()),
    ];
    Ok((headers, Body::from(artifact.bytes)).into_response())
}
