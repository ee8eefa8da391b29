//! Voice catalog handler.

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use songgram_core::VoiceDescriptor;

use crate::error::HttpError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct VoicesResponse {
    pub voices: Vec<VoiceDescriptor>,
}

/// List narration voices offered by the provider.
pub async fn list(State(state): State<AppState>) -> Result<Json<VoicesResponse>, HttpError> {
    let voices = state.songs.list_voices().await?;
    Ok(Json(VoicesResponse { voices }))
}
