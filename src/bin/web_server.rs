//! Trade-summary web server.
//!
//! Environment:
//!   RANK_CRAWLER_CONFIG - TOML config path
//!   HOST / PORT         - bind address (--port, else PORT or server.port, is tried
//!                         first, then 8888, 8080, 8889)
//!   CACHE_DIR           - cache directory
//!   RUST_LOG            - log filter

use clap::Parser;
use rank_crawler::api::{bind_available, serve, AppState};
use rank_crawler::utils::{logger, validation::Validate};
use rank_crawler::AppConfig;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "web-server")]
#[command(about = "JSON API for portfolio trade records and stock summaries")]
struct ServerArgs {
    #[arg(short, long, env = "RANK_CRAWLER_CONFIG")]
    config: Option<PathBuf>,

    #[arg(long)]
    host: Option<String>,

    /// Overrides server.port; busy ports fall through to the candidate list
    #[arg(long)]
    port: Option<u16>,

    #[arg(long)]
    cache_dir: Option<String>,

    /// Use VERCEL_CACHE_DIR or the system temp dir as cache
    #[arg(long)]
    serverless: bool,

    #[arg(long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = ServerArgs::parse();
    logger::init_cli_logger(args.verbose);

    let mut config = match (&args.config, args.serverless) {
        (_, true) => AppConfig::for_serverless(),
        (Some(path), false) => AppConfig::from_file(path)?,
        (None, false) => AppConfig::default(),
    };
    if !args.serverless {
        config.apply_env_overrides();
    }
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(dir) = args.cache_dir {
        config.crawler.cache_dir = dir;
    }
    let preferred = config.server.preferred_port(args.port);

    config.validate()?;
    tracing::info!("📂 Cache directory: {}", config.crawler.cache_dir);

    let state = AppState::from_config(&config)?;
    let listener = bind_available(&config.server.host, Some(preferred)).await?;

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("❌ Failed to listen for Ctrl+C: {}", e);
        }
    };
    serve(state, listener, shutdown).await?;
    Ok(())
}
