//! Style catalog handler.

use axum::Json;
use serde::Serialize;

use songgram_core::{MusicStyle, OCCASION_SUGGESTIONS};

/// Form options for song requests.
#[derive(Debug, Serialize)]
pub struct StylesResponse {
    pub styles: Vec<&'static str>,
    pub occasions: Vec<&'static str>,
}

/// List supported music styles and suggested occasions.
pub async fn list() -> Json<StylesResponse> {
    Json(StylesResponse {
        styles: MusicStyle::labels().collect(),
        occasions: OCCASION_SUGGESTIONS.to_vec(),
    })
}
