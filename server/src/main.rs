//! `petition-server` entry point.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use petition_server::AppState;
use petition_server::ServerConfig;
use petition_server::build_router;
use tokio::net::TcpListener;

#[derive(Debug, Parser)]
#[command(name = "petition-server", version, about = "Petition generation HTTP server")]
struct Args {
    /// Configuration file (default: $PETITION_CONFIG, then ./petition.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Listen address, overriding the configuration
    #[arg(long)]
    host: Option<String>,

    /// Listen port, overriding the configuration and $PORT
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let mut config = ServerConfig::load(args.config.as_deref())
        .context("loading configuration")?
        .with_port_override(std::env::var("PORT").ok().as_deref())?;
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }

    for dir in [&config.temp_dir, &config.out_dir] {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("creating {}", dir.display()))?;
    }

    let state = Arc::new(AppState::from_config(&config));
    let app = build_router(state, config.body_limit_bytes);

    let addr = config.bind_addr().await?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    tracing::info!(
        "petition-server v{} listening on http://{addr}",
        env!("CARGO_PKG_VERSION")
    );
    tracing::info!(
        templates = %config.templates_dir.display(),
        out = %config.out_dir.display(),
        "serving"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("petition-server exiting cleanly");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    tracing::info!("signal received, shutting down");
}
