//! One-shot refresh for the `import` and `refresh` subcommands.

use anyhow::{Context as _, bail};
use forcelog_core::{incident::RefreshMode, stats::StatsFilter, store::IncidentStore};
use forcelog_ingest::{Pipeline, Source};

/// Refresh from `source` and describe the outcome, including the store's
/// row count afterwards. A failed run is an error.
pub async fn run_once<S: IncidentStore>(
  pipeline: &Pipeline<S>,
  source: &Source,
  mode: RefreshMode,
) -> anyhow::Result<String> {
  let report = pipeline.refresh(source, mode).await;
  if let Some(error) = report.error {
    bail!("refresh {} failed: {error}", report.run_id);
  }

  let total = pipeline
    .store()
    .count(&StatsFilter::All)
    .await
    .context("failed to count stored incidents")?;
  Ok(format!(
    "{mode} mode: imported {} rows, skipped {}; store holds {total} incidents",
    report.imported_count, report.skipped_count
  ))
}

#[cfg(test)]
mod tests {
  use std::{io::Write as _, path::PathBuf, sync::Arc, time::Duration};

  use forcelog_ingest::Fetcher;
  use forcelog_store_sqlite::SqliteStore;

  use super::*;

  async fn pipeline() -> Pipeline<SqliteStore> {
    let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
    Pipeline::new(store, Fetcher::new(Duration::from_secs(5)).unwrap())
  }

  #[tokio::test]
  async fn import_reports_counts_and_store_total() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"id,race,state\n1,W,WA\n,B,TX\n3,H,CA\n").unwrap();
    let source = Source::from(file.path().to_path_buf());
    let p = pipeline().await;

    run_once(&p, &source, RefreshMode::Append).await.unwrap();
    let summary = run_once(&p, &source, RefreshMode::Append).await.unwrap();

    assert_eq!(summary, "append mode: imported 2 rows, skipped 1; store holds 4 incidents");
  }

  #[tokio::test]
  async fn failed_run_is_an_error() {
    let p = pipeline().await;
    let err = run_once(&p, &Source::File(PathBuf::from("/no/such/file.csv")), RefreshMode::Replace)
      .await
      .unwrap_err();
    assert!(err.to_string().contains("failed"), "{err}");
  }
}
