use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{build_router, AppState};
use holdings_core::{
    LibraryConfig, DEFAULT_API_KEY, DEFAULT_API_USER, DEFAULT_LIBRARY_PATH, DEFAULT_PORT,
};

/// Holdings object store server
#[derive(Parser, Debug)]
#[command(name = "holdings-run", version, about)]
struct Args {
    /// Root directory of the library
    #[arg(long = "library-path", env = "LIBRARY_PATH", default_value = DEFAULT_LIBRARY_PATH)]
    library_path: PathBuf,

    /// User name required for uploads
    #[arg(long = "apiuser", env = "API_USER", default_value = DEFAULT_API_USER)]
    api_user: String,

    /// Key required for uploads
    #[arg(long = "apikey", env = "API_KEY", default_value = DEFAULT_API_KEY, hide_env_values = true)]
    api_key: String,

    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
    port: u16,

    /// JSON config file; when given it supplies the whole configuration
    #[arg(long, env = "HOLDINGS_CONFIG")]
    config: Option<PathBuf>,
}

/// Main entry point for the holdings server
///
/// Resolves the configuration, opens the library root (creating it if needed) and serves the
/// REST API until interrupted.
///
/// # Environment Variables
/// - `LIBRARY_PATH`, `API_USER`, `API_KEY`, `PORT`, `HOLDINGS_CONFIG`: see `--help`
/// - `RUST_LOG`: log filter (default: `holdings=info`)
///
/// # Returns
/// * `Ok(())` - If the server shuts down cleanly
/// * `Err(anyhow::Error)` - If configuration, startup or serving fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("holdings_run=info".parse()?)
                .add_directive("api_rest=info".parse()?)
                .add_directive("holdings_core=info".parse()?)
                .add_directive("holdings_files=info".parse()?)
                .add_directive("tower_http=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let cfg = LibraryConfig::load(
        args.config.as_deref(),
        args.port,
        args.api_user,
        args.api_key,
        args.library_path,
    )?;
    tracing::debug!(config = ?cfg, "configuration resolved");

    let library = cfg.open_library()?;
    let addr = SocketAddr::from(([0, 0, 0, 0], cfg.port()));
    let app = build_router(AppState::new(Arc::new(cfg), library));

    tracing::info!("++ Starting holdings REST on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("-- Holdings REST stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
