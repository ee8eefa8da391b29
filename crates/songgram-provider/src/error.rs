//! Internal error types for ElevenLabs operations.
//!
//! These errors stay inside `songgram-provider` and are mapped to
//! `ProviderError` at the port boundary.

use thiserror::Error;

pub type ElevenLabsResult<T> = Result<T, ElevenLabsError>;

#[derive(Debug, Error)]
pub enum ElevenLabsError {
    /// Non-success HTTP status.
    #[error("ElevenLabs request failed with status {status}: {url}")]
    Status {
        status: u16,
        url: String,
        /// Response body, truncated.
        body: String,
        /// Parsed `Retry-After` header, if any.
        retry_after_secs: Option<u64>,
    },

    /// The API key is not configured.
    #[error("ELEVENLABS_API_KEY is not configured")]
    MissingApiKey,

    /// A success response with no audio.
    #[error("ElevenLabs returned an empty audio body: {url}")]
    EmptyAudio { url: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_message() {
        let error = ElevenLabsError::Status {
            status: 422,
            url: "https://api.elevenlabs.io/v1/music/generate".to_string(),
            body: String::new(),
            retry_after_secs: None,
        };
        let msg = error.to_string();
        assert!(msg.contains("422"));
        assert!(msg.contains("music/generate"));
    }

    #[test]
    fn test_missing_key_names_variable() {
        assert!(
            ElevenLabsError::MissingApiKey
                .to_string()
                .contains("ELEVENLABS_API_KEY")
        );
    }
}
