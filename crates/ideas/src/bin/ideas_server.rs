//! Ideas REST Server
//!
//! Serves the ideas API from memory, with evaluations, clustering and classification
//! delegated to Gemini.

use anyhow::{Context, Result};
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use ideas::config::Settings;
use ideas::server::services::{GeminiModel, PromptAnalyst};
use ideas::server::{start_server, AppState};

#[derive(Parser)]
#[command(name = "ideas_server")]
#[command(about = "Ideas REST API Server")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Args {
  /// Server bind address; defaults to the configured host and port
  #[arg(long)]
  bind: Option<SocketAddr>,

  /// Enable verbose logging
  #[arg(short, long)]
  verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
    if args.verbose {
      EnvFilter::new("ideas=debug,tower_http=debug,info")
    } else {
      EnvFilter::new("ideas=info,warn")
    }
  });
  tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

  let settings = Settings::load()?;
  let bind = match args.bind {
    Some(addr) => addr,
    None => format!("{}:{}", settings.server.host, settings.server.port)
      .parse()
      .context("Invalid server host or port in settings")?,
  };

  tracing::info!("Starting Ideas REST Server v{}", env!("CARGO_PKG_VERSION"));
  tracing::info!("Using model {}", settings.ai.model);

  let model = GeminiModel::new(settings.ai.clone(), settings.timeout_secs)?;
  let state = AppState::new(Arc::new(PromptAnalyst::new(model)));

  start_server(bind, state).await
}
