//! Subcommands and their arguments.

use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use clap::{Args, Subcommand};

use songgram_axum::ServerConfig;
use songgram_core::{LateResultPolicy, Settings};
use songgram_provider::{DEFAULT_BASE_URL, ProviderClientConfig};

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server
    Serve(ServeArgs),

    /// Print supported music styles and suggested occasions
    Styles,
}

/// Options for `songgram serve`. Every flag can also come from the environment.
#[derive(Debug, Clone, Args)]
pub struct ServeArgs {
    /// Address to bind
    #[arg(long, env = "SONGGRAM_HOST", default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    pub host: IpAddr,

    /// Port to listen on
    #[arg(short, long, env = "SONGGRAM_PORT", default_value_t = songgram_axum::bootstrap::DEFAULT_PORT)]
    pub port: u16,

    /// ElevenLabs API key
    #[arg(long, env = "ELEVENLABS_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// ElevenLabs API base URL
    #[arg(long, env = "ELEVENLABS_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Seconds before a processing song reports as timed out
    #[arg(long, env = "SONGGRAM_MAX_PROCESSING_SECS", default_value_t = 300)]
    pub max_processing_secs: u64,

    /// Seconds a song stays fetchable; at least the processing timeout
    #[arg(long, env = "SONGGRAM_JOB_RETENTION_SECS", default_value_t = 3600)]
    pub job_retention_secs: u64,

    /// Comma-separated CORS origins (any origin when empty)
    #[arg(long, env = "SONGGRAM_ALLOWED_ORIGINS", value_delimiter = ',')]
    pub allowed_origins: Vec<String>,

    /// Store results that arrive after the timeout instead of dropping them
    #[arg(long, env = "SONGGRAM_ACCEPT_LATE_RESULTS")]
    pub accept_late_results: bool,

    /// Seconds to wait for running generations on shutdown
    #[arg(long, env = "SONGGRAM_SHUTDOWN_GRACE_SECS", default_value_t = 30)]
    pub shutdown_grace_secs: u64,
}

impl ServeArgs {
    /// Build the server configuration.
    pub fn into_server_config(self) -> ServerConfig {
        let late = if self.accept_late_results {
            LateResultPolicy::Accept
        } else {
            LateResultPolicy::Discard
        };
        let settings = Settings::default()
            .with_max_processing_secs(self.max_processing_secs)
            .with_job_retention_secs(self.job_retention_secs)
            .with_late_result_policy(late);
        let provider = ProviderClientConfig::new()
            .with_base_url(self.base_url)
            .with_optional_api_key(self.api_key);
        let origins: Vec<String> = self
            .allowed_origins
            .into_iter()
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty())
            .collect();

        let mut config = ServerConfig::with_defaults()
            .with_settings(settings)
            .with_provider(provider)
            .with_allowed_origins(origins);
        config.host = self.host;
        config.port = self.port;
        config.shutdown_grace = Duration::from_secs(self.shutdown_grace_secs);
        config
    }
}
