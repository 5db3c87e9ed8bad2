use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::info;

use mediahub_data::compiler;
use mediahub_data::config::Config;

use mediahub_web::state::AppState;

#[derive(Parser)]
#[command(name = "mediahub-web", about = "Conference media backend API server")]
struct Cli {
    /// Path to config file (default: ~/.config/mediahub/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the configured HTTP port
    #[arg(long)]
    port: Option<u16>,

    /// Override the configured database path
    #[arg(long)]
    database: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_ref())?;
    if let Some(port) = cli.port {
        config.http_port = port;
    }
    if let Some(database) = cli.database {
        config.database_path = database;
    }

    let compiler = compiler::from_config(&config.compiler);
    let (download_tx, download_rx) = mpsc::channel(64);
    let db_path = config.database_path.clone();
    let port = config.http_port;

    let state = AppState::open(&db_path, config, compiler, download_tx)?;
    info!(database = %db_path.display(), "database ready");

    let cancel = CancellationToken::new();
    let worker = mediahub_web::downloader::spawn(state.clone(), download_rx, cancel.clone());

    let app = mediahub_web::build_router(state);
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    info!("mediahub-web listening on http://{}", addr);

    let listener = TcpListener::bind(addr).await?;
    tokio::select! {
        result = axum::serve(listener, app) => result?,
        _ = tokio::signal::ctrl_c() => {
            info!("received ctrl-c, shutting down");
        }
    }

    cancel.cancel();
    worker.await?;

    Ok(())
}
