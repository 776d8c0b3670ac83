//! Periodic replace-mode refresh, for deployments without an external
//! scheduler calling `/update-database`.

use std::{sync::Arc, time::Duration};

use forcelog_core::{incident::RefreshMode, store::IncidentStore};
use forcelog_ingest::{Pipeline, Source};
use tokio::{
  task::JoinHandle,
  time::{MissedTickBehavior, interval},
};
use tracing::{info, warn};

/// Spawn a task that refreshes from `source` every `every`. The first run
/// happens one full period after startup.
///
/// A tick that finds a refresh already running is skipped.
pub fn spawn_refresh_task<S>(
  pipeline: Arc<Pipeline<S>>,
  source: Source,
  every: Duration,
) -> JoinHandle<()>
where
  S: IncidentStore + 'static,
{
  info!(period_secs = every.as_secs(), %source, "scheduled refresh enabled");
  tokio::spawn(async move {
    let mut ticker = interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker.tick().await;

    loop {
      ticker.tick().await;
      let report = pipeline.refresh(&source, RefreshMode::Replace).await;
      if let Some(error) = &report.error {
        warn!(run_id = %report.run_id, error = %error, "scheduled refresh failed");
      }
    }
  })
}

#[cfg(test)]
mod tests {
  use std::io::Write as _;

  use forcelog_core::stats::StatsFilter;
  use forcelog_ingest::Fetcher;
  use forcelog_store_sqlite::SqliteStore;

  use super::*;

  #[tokio::test]
  async fn refreshes_on_each_period() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"id,race,state\n1,W,WA\n2,B,TX\n").unwrap();

    let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
    let pipeline = Arc::new(Pipeline::new(
      store.clone(),
      Fetcher::new(Duration::from_secs(5)).unwrap(),
    ));

    let handle = spawn_refresh_task(
      pipeline,
      Source::from(file.path().to_path_buf()),
      Duration::from_millis(50),
    );

    let loaded = tokio::time::timeout(Duration::from_secs(5), async {
      loop {
        if store.count(&StatsFilter::All).await.unwrap() == 2 {
          break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
      }
    })
    .await;
    handle.abort();

    assert!(loaded.is_ok(), "scheduled refresh never loaded the file");
  }
}
