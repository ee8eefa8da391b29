//! HTTP backend abstraction for the ElevenLabs API.
//!
//! The client is generic over [`HttpBackend`] so tests can swap reqwest for
//! canned responses. Backends report raw failures; classification into
//! `ProviderError` happens at the port boundary.

use async_trait::async_trait;
use bytes::Bytes;
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

use crate::config::ProviderClientConfig;
use crate::error::{ElevenLabsError, ElevenLabsResult};

/// Longest error body kept for diagnostics.
const MAX_ERROR_BODY_CHARS: usize = 512;

const API_KEY_HEADER: &str = "xi-api-key";

// ============================================================================
// HTTP Backend Trait
// ============================================================================

#[async_trait]
pub trait HttpBackend: Send + Sync {
    /// GET a URL and deserialize the JSON body.
    async fn get_json<T: DeserializeOwned + Send>(&self, url: &Url) -> ElevenLabsResult<T>;

    /// POST a JSON body and return the raw audio response.
    async fn post_for_audio<B: Serialize + Sync>(
        &self,
        url: &Url,
        body: &B,
    ) -> ElevenLabsResult<Bytes>;
}

// ============================================================================
// Reqwest Backend
// ============================================================================

/// Production backend. Makes exactly one request per call; the fallback
/// ladder above it decides what happens next.
pub struct ReqwestBackend {
    client: reqwest::Client,
    api_key: Option<String>,
}

impl ReqwestBackend {
    pub fn new(config: &ProviderClientConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .expect("failed to create HTTP client");

        Self {
            client,
            api_key: config.api_key.clone(),
        }
    }

    fn api_key(&self) -> ElevenLabsResult<&str> {
        self.api_key
            .as_deref()
            .ok_or(ElevenLabsError::MissingApiKey)
    }

    /// Turn a non-success response into a status error.
    async fn status_error(url: &Url, response: reqwest::Response) -> ElevenLabsError {
        let status = response.status().as_u16();
        let retry_after_secs = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|h| h.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());
        let body = response.text().await.unwrap_or_default();

        ElevenLabsError::Status {
            status,
            url: url.to_string(),
            body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            retry_after_secs,
        }
    }
}

#[async_trait]
impl HttpBackend for ReqwestBackend {
    async fn get_json<T: DeserializeOwned + Send>(&self, url: &Url) -> ElevenLabsResult<T> {
        let response = self
            .client
            .get(url.as_str())
            .header(API_KEY_HEADER, self.api_key()?)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::status_error(url, response).await);
        }

        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }

    async fn post_for_audio<B: Serialize + Sync>(
        &self,
        url: &Url,
        body: &B,
    ) -> ElevenLabsResult<Bytes> {
        let response = self
            .client
            .post(url.as_str())
            .header(API_KEY_HEADER, self.api_key()?)
            .header(reqwest::header::ACCEPT, "audio/mpeg")
            .json(body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::status_error(url, response).await);
        }

        let audio = response.bytes().await?;
        if audio.is_empty() {
            return Err(ElevenLabsError::EmptyAudio {
                url: url.to_string(),
            });
        }
        Ok(audio)
    }
}

// ============================================================================
// Fake Backend for Testing
// ============================================================================
