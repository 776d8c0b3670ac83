//! forcelog-server binary.
//!
//! Reads `forcelog.toml` (or the path given with `--config`) plus
//! `FORCELOG_*` environment variables, opens the SQLite store, and either
//! serves the HTTP API or runs a one-shot import/refresh.
//!
//! # Bootstrapping
//!
//! ```text
//! forcelog-server import ./fatal-police-shootings-data.csv
//! forcelog-server serve
//! ```

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use forcelog_api::AppState;
use forcelog_core::incident::RefreshMode;
use forcelog_ingest::{Fetcher, Pipeline, Source};
use forcelog_server::{ServerConfig, run::run_once, schedule::spawn_refresh_task};
use forcelog_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Forcelog stats server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "forcelog.toml", global = true)]
  config: PathBuf,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
  /// Serve the HTTP API (the default).
  Serve,
  /// Load a local CSV file into the store.
  Import {
    path: PathBuf,
    #[arg(long, default_value = "append")]
    mode: RefreshMode,
  },
  /// Refresh once from the configured source URL and exit.
  Refresh {
    #[arg(long, default_value = "replace")]
    mode: RefreshMode,
  },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let cfg = ServerConfig::load(&cli.config)
    .with_context(|| format!("failed to load configuration from {:?}", cli.config))?;

  let store = SqliteStore::open(&cfg.store_path)
    .await
    .with_context(|| format!("failed to open store at {:?}", cfg.store_path))?;

  let fetcher = Fetcher::new(cfg.fetch_timeout()).context("failed to build http client")?;
  let pipeline = Arc::new(Pipeline::new(Arc::new(store), fetcher));

  match cli.command.unwrap_or(Command::Serve) {
    Command::Serve => serve(cfg, pipeline).await,
    Command::Import { path, mode } => {
      println!("{}", run_once(pipeline.as_ref(), &Source::File(path), mode).await?);
      Ok(())
    }
    Command::Refresh { mode } => {
      println!("{}", run_once(pipeline.as_ref(), &cfg.source(), mode).await?);
      Ok(())
    }
  }
}

async fn serve(cfg: ServerConfig, pipeline: Arc<Pipeline<SqliteStore>>) -> anyhow::Result<()> {
  let settings = cfg.api_settings();
  if settings.cron_secret.is_none() {
    tracing::warn!("no cron_secret configured; /update-database will reject every request");
  }

  if let Some(every) = cfg.refresh_interval() {
    spawn_refresh_task(pipeline.clone(), cfg.source(), every);
  }

  let app = forcelog_api::router(AppState::new(pipeline, settings));
  let address = cfg.address();

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
