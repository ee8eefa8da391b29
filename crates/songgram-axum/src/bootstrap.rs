//! Axum server bootstrap - the composition root.
//!
//! This module is the ONLY place where infrastructure is wired together
//! for the web adapter. All concrete implementations are instantiated here.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use songgram_core::{Settings, SynthesisProviderPort, validate_settings};
use songgram_jobs::SongService;
use songgram_provider::{DefaultElevenLabsClient, ProviderClientConfig};

/// Default listening port.
pub const DEFAULT_PORT: u16 = 3000;

/// Default time to let in-flight generations finish on shutdown.
pub const DEFAULT_SHUTDOWN_GRACE: Duration = Duration::from_secs(30);

/// CORS configuration for the web server.
#[derive(Debug, Clone, Default)]
pub enum CorsConfig {
    /// Allow all origins (development mode).
    #[default]
    AllowAll,
    /// Allow specific origins (production mode).
    AllowOrigins(Vec<String>),
}

/// Server configuration for the Axum adapter.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind.
    pub host: IpAddr,
    /// Port for the HTTP server.
    pub port: u16,
    /// CORS configuration.
    pub cors: CorsConfig,
    /// ElevenLabs client configuration, including the API key.
    pub provider: ProviderClientConfig,
    /// Orchestrator tunables.
    pub settings: Settings,
    /// How long shutdown waits for running generations.
    pub shutdown_grace: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl ServerConfig {
    /// Create config with default values and no API key.
    pub fn with_defaults() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            cors: CorsConfig::default(),
            provider: ProviderClientConfig::default(),
            settings: Settings::default(),
            shutdown_grace: DEFAULT_SHUTDOWN_GRACE,
        }
    }

    /// Set CORS to allow specific origins. An empty list keeps allow-all.
    #[must_use]
    pub fn with_allowed_origins(mut self, origins: Vec<String>) -> Self {
        if !origins.is_empty() {
            self.cors = CorsConfig::AllowOrigins(origins);
        }
        self
    }

    #[must_use]
    pub fn with_provider(mut self, provider: ProviderClientConfig) -> Self {
        self.provider = provider;
        self
    }

    #[must_use]
    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

/// Application context for the Axum adapter.
pub struct AxumContext {
    /// The song generation orchestrator.
    pub songs: Arc<SongService>,
}

impl AxumContext {
    pub const fn new(songs: Arc<SongService>) -> Self {
        Self { songs }
    }

    /// Build a context around any provider. Used by tests and alternate hosts.
    pub fn with_provider(
        provider: Arc<dyn SynthesisProviderPort>,
        settings: Settings,
    ) -> Result<Self> {
        validate_settings(&settings).context("Invalid orchestrator settings")?;
        Ok(Self::new(Arc::new(SongService::new(provider, settings))))
    }
}

/// Bootstrap the Axum server with all services.
pub fn bootstrap(config: &ServerConfig) -> Result<AxumContext> {
    tracing::info!(
        target: "songgram.http",
        base_url = config.provider.base_url(),
        api_key_present = config.provider.has_api_key(),
        api_key_len = config.provider.api_key_len(),
        max_processing_secs = config.settings.max_processing_secs,
        late_result_policy = ?config.settings.late_result_policy,
        "Axum bootstrap resolved configuration"
    );

    if !config.provider.has_api_key() {
        tracing::warn!(
            target: "songgram.http",
            "ELEVENLABS_API_KEY is not set; song submissions will be rejected"
        );
    }

    let provider: Arc<dyn SynthesisProviderPort> =
        Arc::new(DefaultElevenLabsClient::new(&config.provider));
    AxumContext::with_provider(provider, config.settings.clone())
}

/// Start the web server and run until Ctrl-C.
///
/// After the listener stops, running generation tasks get up to
/// `config.shutdown_grace` to finish.
pub async fn start_server(config: ServerConfig) -> Result<()> {
    use tokio::net::TcpListener;
    use tracing::info;

    let ctx = bootstrap(&config)?;
    let songs = Arc::clone(&ctx.songs);
    let app = crate::routes::create_router(ctx, &config.cors);

    let addr = config.socket_addr();
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("songgram web server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("HTTP server stopped, draining generation tasks");
    if !songs.shutdown(config.shutdown_grace).await {
        tracing::warn!(
            target: "songgram.http",
            grace_secs = config.shutdown_grace.as_secs(),
            "Some generation tasks were abandoned"
        );
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(target: "songgram.http", error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    tracing::info!(target: "songgram.http", "Shutdown signal received");
}
