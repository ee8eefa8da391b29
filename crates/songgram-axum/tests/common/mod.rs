//! Shared helpers for songgram-axum router tests.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response};
use http_body_util::BodyExt;
use tower::ServiceExt;

use songgram_axum::{AxumContext, CorsConfig, create_router};
use songgram_core::Settings;
use songgram_jobs::testing::ScriptedProvider;

/// Origin allowed by [`router_with_origins`].
pub const TEST_CORS_ORIGIN: &str = "http://localhost:5173";

pub fn router(provider: ScriptedProvider) -> Router {
    router_with(provider, Settings::default())
}

pub fn router_with(provider: ScriptedProvider, settings: Settings) -> Router {
    let ctx = AxumContext::with_provider(Arc::new(provider), settings).unwrap();
    create_router(ctx, &CorsConfig::AllowAll)
}

/// Router that only allows [`TEST_CORS_ORIGIN`].
pub fn router_with_origins(provider: ScriptedProvider) -> Router {
    let ctx = AxumContext::with_provider(Arc::new(provider), Settings::default()).unwrap();
    create_router(
        ctx,
        &CorsConfig::AllowOrigins(vec![TEST_CORS_ORIGIN.to_string()]),
    )
}

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

/// Assert the response body is valid JSON and return the parsed value.
pub async fn parse_json(response: Response<Body>) -> serde_json::Value {
    let body = body_bytes(response).await;
    serde_json::from_slice(&body).unwrap_or_else(|e| panic!("Expected valid JSON body: {e}"))
}

pub fn song_request() -> serde_json::Value {
    serde_json::json!({
        "occasion": "Birthday",
        "recipientNames": "Sarah",
        "relationship": "daughter",
        "musicStyle": "Pop",
        "voiceStyle": "",
        "story": "She turns nine and loves the sea."
    })
}
