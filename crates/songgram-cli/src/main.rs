//! CLI entry point - the composition root.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use songgram_cli::{Cli, Commands};
use songgram_core::{MusicStyle, OCCASION_SUGGESTIONS};

fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .compact()
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables before clap reads them
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.default_log_filter());

    match cli.command {
        Commands::Serve(args) => {
            let config = args.into_server_config();
            tracing::info!(
                target: "songgram.cli",
                addr = %config.socket_addr(),
                "Starting songgram"
            );
            songgram_axum::start_server(config).await?;
        }
        Commands::Styles => {
            println!("Styles:");
            for style in MusicStyle::labels() {
                println!("  {style}");
            }
            println!();
            println!("Occasions:");
            for occasion in OCCASION_SUGGESTIONS {
                println!("  {occasion}");
            }
        }
    }

    Ok(())
}
