//! `forcelog`: command-line reporting client for a forcelog server.
//!
//! # Usage
//!
//! ```text
//! forcelog stats --state WA --limit 20
//! forcelog --url http://stats.example.org refresh
//! forcelog --config ~/.config/forcelog/cli.toml stats
//! ```

mod client;
mod render;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use client::{ApiClient, ApiConfig};
use serde::Deserialize;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "forcelog", about = "Reporting client for the forcelog stats service")]
struct Args {
  /// Path to a TOML config file (url, cron_secret).
  #[arg(short, long, value_name = "FILE", global = true)]
  config: Option<std::path::PathBuf>,

  /// Base URL of the forcelog server (default: http://localhost:8000).
  #[arg(long, env = "FORCELOG_URL", global = true)]
  url: Option<String>,

  /// Shared secret for triggering a refresh.
  #[arg(long, env = "FORCELOG_CRON_SECRET", global = true, hide_env_values = true)]
  cron_secret: Option<String>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Print the race breakdown and the most recent incidents.
  Stats {
    /// Two-letter state code; omit for all states.
    #[arg(long)]
    state: Option<String>,
    /// Number of recent incidents to list.
    #[arg(long, default_value_t = 10)]
    limit: usize,
  },
  /// Ask the server to reload the upstream dataset.
  Refresh,
}

// ─── Config file ──────────────────────────────────────────────────────────────

/// Shape of the optional TOML config file.
#[derive(Deserialize, Default)]
struct ConfigFile {
  #[serde(default)]
  url:         String,
  #[serde(default)]
  cron_secret: String,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let args = Args::parse();

  let file_cfg: ConfigFile = if let Some(path) = &args.config {
    let raw = std::fs::read_to_string(path)
      .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).context("parsing config file")?
  } else {
    ConfigFile::default()
  };

  // CLI flags override config file, which overrides defaults.
  let api_config = ApiConfig {
    base_url:    args
      .url
      .or_else(|| (!file_cfg.url.is_empty()).then(|| file_cfg.url.clone()))
      .unwrap_or_else(|| "http://localhost:8000".to_string()),
    cron_secret: args
      .cron_secret
      .or_else(|| (!file_cfg.cron_secret.is_empty()).then(|| file_cfg.cron_secret.clone()))
      .unwrap_or_default(),
  };

  let client = ApiClient::new(api_config)?;

  match args.command {
    Command::Stats { state, limit } => {
      let report = client.stats(state.as_deref()).await?;
      if report.stats.is_empty() {
        println!("no incidents recorded");
        return Ok(());
      }
      print!("{}", render::race_table(&report.stats));
      if limit > 0 && !report.recent_incidents.is_empty() {
        println!();
        print!("{}", render::incident_lines(&report.recent_incidents, limit));
      }
    }
    Command::Refresh => {
      let outcome = client.refresh().await?;
      if outcome.status != "success" {
        bail!(
          "refresh failed: {}",
          outcome.message.as_deref().unwrap_or("no message from server")
        );
      }
      println!(
        "imported {} rows, skipped {}",
        outcome.updated_count.unwrap_or(0),
        outcome.skipped_count.unwrap_or(0)
      );
    }
  }

  Ok(())
}
