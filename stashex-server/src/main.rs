use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use stashex_server::{AppState, ConfigLoader, routes};
use stashex_server::infra::config::CliOverrides;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// CLI entry point
#[derive(Parser, Debug)]
#[command(name = "stashex-server")]
#[command(about = "Stash-backed custom metadata provider for Plex Media Server")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, env = "STASHEX_CONFIG")]
    config: Option<PathBuf>,

    /// Server port (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Server host (overrides config)
    #[arg(long)]
    host: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_file_loaded = dotenvy::dotenv().is_ok();
    let args = Cli::parse();

    let config = ConfigLoader::load(CliOverrides {
        config_path: args.config,
        host: args.host,
        port: args.port,
    })?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                // Debug mode opens everything up; override via RUST_LOG.
                if config.debug {
                    "debug,tower_http=info".into()
                } else {
                    "info,tower_http=warn".into()
                }
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if env_file_loaded {
        info!("loaded .env file");
    }
    info!("Stash backend: {}", config.stash.host);
    if config.agent.poster_mode {
        info!("poster mode enabled, artwork served as 2:3 posters");
    }
    if let Some((pms_url, _)) = config.upload_settings() {
        info!("Plex poster upload enabled -> {pms_url}");
    }

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::from_config(config);
    let router = routes::create_router(state);

    info!("Starting Stashex metadata provider on {addr}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    axum::serve(listener, router).await?;

    Ok(())
}
