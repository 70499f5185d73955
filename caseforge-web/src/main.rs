//! Caseforge Web Server
//!
//! Serves test-case recommendations for files located across GitHub repositories.

use caseforge_core::CaseforgeConfig;
use caseforge_web::{init_logging, CaseforgeServerBuilder};
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info, warn};

/// Caseforge Web Server - test-case recommendations over HTTP
#[derive(Parser)]
#[command(name = "caseforge-web")]
#[command(about = "HTTP service for Caseforge test-case recommendations")]
#[command(version)]
struct Args {
    /// Server host to bind to (overrides config and CASEFORGE_HOST)
    #[arg(long)]
    host: Option<String>,

    /// Server port to listen on (overrides config and CASEFORGE_PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// Configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Environment file loaded before configuration
    #[arg(long)]
    env_file: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Load environment variables; a missing default .env is fine
    match &args.env_file {
        Some(path) => {
            if let Err(e) = dotenvy::from_path(path) {
                eprintln!("Failed to load {}: {}", path.display(), e);
                std::process::exit(1);
            }
        }
        None => {
            dotenvy::dotenv().ok();
        }
    }

    if let Err(e) = init_logging(&args.log_level) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    let config = match CaseforgeConfig::load(args.config.as_ref()) {
        Ok(config) => config,
        Err(e) => {
            e.log();
            std::process::exit(1);
        }
    };

    if config.github.token.is_none() {
        warn!("GITHUB_TOKEN is not set; only public data will be visible");
    }

    let mut builder = CaseforgeServerBuilder::new().config(config);
    if let Some(host) = args.host {
        builder = builder.host(host);
    }
    if let Some(port) = args.port {
        builder = builder.port(port);
    }

    let server = match builder.build().await {
        Ok(server) => server,
        Err(e) => {
            error!("Failed to build server: {}", e);
            std::process::exit(1);
        }
    };

    info!(
        scope = %server.config().github.scope(),
        "Serving recommendations"
    );

    if let Err(e) = server.start().await {
        error!("Server failed: {}", e);
        std::process::exit(1);
    }
}
