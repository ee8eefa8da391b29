//! Public configuration for the ElevenLabs client.

use std::fmt;
use std::time::Duration;

/// Default ElevenLabs API base.
pub const DEFAULT_BASE_URL: &str = "https://api.elevenlabs.io/v1";

/// Configuration for the ElevenLabs client.
///
/// # Example
///
/// ```
/// use songgram_provider::ProviderClientConfig;
/// use std::time::Duration;
///
/// let config = ProviderClientConfig::new()
///     .with_api_key("sk_live_example")
///     .with_timeout(Duration::from_secs(90));
/// assert!(config.has_api_key());
/// ```
#[derive(Clone)]
pub struct ProviderClientConfig {
    pub(crate) base_url: String,
    pub(crate) api_key: Option<String>,
    pub(crate) user_agent: String,
    pub(crate) timeout: Duration,
}

// The key must never reach a log line.
impl fmt::Debug for ProviderClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderClientConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("user_agent", &self.user_agent)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Default for ProviderClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            user_agent: concat!("songgram-provider/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout: Duration::from_secs(60),
        }
    }
}

impl ProviderClientConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the API base URL. Defaults to `https://api.elevenlabs.io/v1`.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the key from an optional source. Blank keys count as missing.
    #[must_use]
    pub fn with_optional_api_key(mut self, key: Option<String>) -> Self {
        self.api_key = key.filter(|k| !k.trim().is_empty());
        self
    }

    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Per-request timeout. Defaults to 60 seconds.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub const fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Length of the configured key, for startup diagnostics.
    #[must_use]
    pub fn api_key_len(&self) -> usize {
        self.api_key.as_ref().map_or(0, String::len)
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}
