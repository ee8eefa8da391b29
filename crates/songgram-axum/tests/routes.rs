//! Router tests for the `/api/*` song endpoints.
//!
//! The router is driven in-process with `oneshot`; the provider is the
//! scripted fake from `songgram-jobs`, so no network is touched.

mod common;

use std::time::Duration;

use axum::http::StatusCode;
use songgram_core::ProviderError;
use songgram_jobs::testing::{MUSIC_AUDIO, ScriptedProvider};

use common::{
    TEST_CORS_ORIGIN, body_bytes, get, parse_json, post_json, router, router_with_origins, send,
    song_request,
};

async fn submit(app: &axum::Router) -> String {
    let response = send(app, post_json("/api/songs", &song_request())).await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let json = parse_json(response).await;
    json["songId"].as_str().unwrap().to_string()
}

async fn wait_until_finished(app: &axum::Router, id: &str) -> serde_json::Value {
    for _ in 0..200 {
        let json = parse_json(send(app, get(&format!("/api/songs/{id}"))).await).await;
        if json["status"] != "processing" {
            return json;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("song {id} never finished");
}

// ── Health and catalogs ──────────────────────────────────────────────────────

#[tokio::test]
async fn health_returns_ok() {
    let app = router(ScriptedProvider::new());
    let response = send(&app, get("/health")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, b"OK");
}

#[tokio::test]
async fn styles_lists_catalog_and_occasions() {
    let app = router(ScriptedProvider::new());
    let json = parse_json(send(&app, get("/api/styles")).await).await;

    let styles = json["styles"].as_array().unwrap();
    assert_eq!(styles.len(), 15);
    assert!(styles.iter().any(|s| s == "Old Skool Hip Hop"));
    assert_eq!(json["occasions"][0], "Birthday");
}

#[tokio::test]
async fn voices_are_listed() {
    let app = router(ScriptedProvider::new());
    let response = send(&app, get("/api/voices")).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = parse_json(response).await;
    assert_eq!(json["voices"][0]["name"], "Rachel");
}

#[tokio::test]
async fn voices_rate_limit_maps_to_429() {
    let app = router(
        ScriptedProvider::new().with_voices_error(ProviderError::RateLimited {
            retry_after_secs: Some(5),
        }),
    );
    let response = send(&app, get("/api/voices")).await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn voices_without_key_is_unavailable() {
    let app = router(ScriptedProvider::new().unconfigured());
    let response = send(&app, get("/api/voices")).await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

// ── CORS ─────────────────────────────────────────────────────────────────────

fn get_from_origin(uri: &str, origin: &str) -> axum::http::Request<axum::body::Body> {
    axum::http::Request::builder()
        .uri(uri)
        .header("origin", origin)
        .body(axum::body::Body::empty())
        .unwrap()
}

#[tokio::test]
async fn listed_origin_is_allowed() {
    let app = router_with_origins(ScriptedProvider::new());
    let response = send(&app, get_from_origin("/api/styles", TEST_CORS_ORIGIN)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["access-control-allow-origin"],
        TEST_CORS_ORIGIN
    );
}

#[tokio::test]
async fn unlisted_origin_gets_no_allow_header() {
    let app = router_with_origins(ScriptedProvider::new());
    let response = send(&app, get_from_origin("/api/styles", "https://elsewhere.example")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response
            .headers()
            .get("access-control-allow-origin")
            .is_none()
    );
}

// ── Submit ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn submit_returns_links_and_processing() {
    let app = router(ScriptedProvider::new().with_delay(Duration::from_millis(100)));
    let response = send(&app, post_json("/api/songs", &song_request())).await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let json = parse_json(response).await;
    let id = json["songId"].as_str().unwrap();
    assert!(id.starts_with("song_"));
    assert_eq!(json["status"], "processing");
    assert_eq!(json["estimatedSeconds"], 120);
    assert_eq!(json["statusUrl"], format!("/api/songs/{id}"));
    assert_eq!(json["audioUrl"], format!("/api/songs/{id}/audio"));

    let status = parse_json(send(&app, get(&format!("/api/songs/{id}"))).await).await;
    assert_eq!(status["status"], "processing");
    assert_eq!(status["songId"], id);
    assert!(status.get("audioUrl").is_none());
}

#[tokio::test]
async fn legacy_generate_route_submits() {
    let app = router(ScriptedProvider::new());
    let response = send(&app, post_json("/api/generate", &song_request())).await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);
}

#[tokio::test]
async fn invalid_request_is_400_with_fields() {
    let app = router(ScriptedProvider::new());
    let mut body = song_request();
    body["story"] = serde_json::json!("");
    body["musicStyle"] = serde_json::json!("Polka");

    let response = send(&app, post_json("/api/songs", &body)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = parse_json(response).await;
    assert_eq!(json["type"], "VALIDATION");
    let fields: Vec<&str> = json["metadata"]["fields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, vec!["story", "musicStyle"]);
}

#[tokio::test]
async fn malformed_json_is_400() {
    let app = router(ScriptedProvider::new());
    let request = axum::http::Request::builder()
        .method("POST")
        .uri("/api/songs")
        .header("content-type", "application/json")
        .body(axum::body::Body::from("{not json"))
        .unwrap();
    let response = send(&app, request).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn submit_without_key_is_503() {
    let app = router(ScriptedProvider::new().unconfigured());
    let response = send(&app, post_json("/api/songs", &song_request())).await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let json = parse_json(response).await;
    assert_eq!(json["error"], "Song generation is temporarily unavailable");
}

// ── Status and audio ─────────────────────────────────────────────────────────

#[tokio::test]
async fn unknown_song_is_404_everywhere() {
    let app = router(ScriptedProvider::new());
    for uri in [
        "/api/songs/song_0_missing",
        "/api/songs/song_0_missing/audio",
        "/api/status?songId=song_0_missing",
        "/api/song/song_0_missing",
    ] {
        let response = send(&app, get(uri)).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{uri}");
    }
}

#[tokio::test]
async fn status_query_requires_song_id() {
    let app = router(ScriptedProvider::new());
    let response = send(&app, get("/api/status")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn audio_before_completion_is_202() {
    let app = router(ScriptedProvider::new().with_delay(Duration::from_millis(300)));
    let id = submit(&app).await;

    let response = send(&app, get(&format!("/api/songs/{id}/audio"))).await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let json = parse_json(response).await;
    assert_eq!(json["type"], "NOT_READY");
    assert_eq!(json["metadata"]["songStatus"], "processing");
}

#[tokio::test]
async fn completed_song_downloads_exact_bytes() {
    let app = router(ScriptedProvider::new());
    let id = submit(&app).await;

    let status = wait_until_finished(&app, &id).await;
    assert_eq!(status["status"], "completed");
    assert_eq!(status["audioUrl"], format!("/api/songs/{id}/audio"));
    assert_eq!(status["strategy"]["kind"], "music");
    assert_eq!(status["sizeBytes"], MUSIC_AUDIO.len());

    for uri in [format!("/api/songs/{id}/audio"), format!("/api/song/{id}")] {
        let response = send(&app, get(&uri)).await;
        assert_eq!(response.status(), StatusCode::OK);

        let headers = response.headers();
        assert_eq!(headers["content-type"], "audio/mpeg");
        assert_eq!(headers["content-length"], MUSIC_AUDIO.len().to_string());
        assert_eq!(
            headers["content-disposition"],
            format!("attachment; filename=\"{id}.mp3\"")
        );
        assert_eq!(headers["cache-control"], "private, max-age=3600");
        assert_eq!(body_bytes(response).await, MUSIC_AUDIO);
    }
}

#[tokio::test]
async fn legacy_status_route_matches() {
    let app = router(ScriptedProvider::new());
    let id = submit(&app).await;
    wait_until_finished(&app, &id).await;

    let json = parse_json(send(&app, get(&format!("/api/status?songId={id}"))).await).await;
    assert_eq!(json["songId"], id.as_str());
    assert_eq!(json["status"], "completed");
}

#[tokio::test]
async fn failed_song_reports_reason_and_refuses_audio() {
    let app = router(
        ScriptedProvider::new().with_music_failing(&ProviderError::RateLimited {
            retry_after_secs: None,
        }),
    );
    let id = submit(&app).await;

    let status = wait_until_finished(&app, &id).await;
    assert_eq!(status["status"], "failed");
    assert_eq!(status["errorKind"], "rate_limited");

    let response = send(&app, get(&format!("/api/songs/{id}/audio"))).await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let json = parse_json(response).await;
    assert_eq!(json["metadata"]["songStatus"], "failed");
    assert_eq!(json["metadata"]["retryable"], false);
}
