//! HTTP surface for Forcelog.
//!
//! Exposes an axum [`Router`] backed by any [`IncidentStore`]:
//!
//! | Route                  | Auth          | Handler                |
//! |------------------------|---------------|------------------------|
//! | `GET /`                | none          | liveness/info          |
//! | `GET /api/stats`       | none          | [`stats::handler`]     |
//! | `GET /stats`           | none          | alias of `/api/stats`  |
//! | `GET /update-database` | bearer secret | [`refresh::handler`]   |
//!
//! Every route answers with JSON. Only a failed secret check produces a
//! non-`200` status.

pub mod auth;
pub mod error;
pub mod refresh;
pub mod stats;

pub use error::ApiError;

use std::sync::Arc;

use axum::{Json, Router, routing::get};
use forcelog_core::store::IncidentStore;
use forcelog_ingest::{Pipeline, Source};
use serde_json::{Value, json};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

// ─── Application state ────────────────────────────────────────────────────────

/// Settings the handlers need beyond the pipeline itself.
#[derive(Debug, Clone)]
pub struct ApiSettings {
  /// Shared secret for `/update-database`. `None` disables the endpoint.
  pub cron_secret:  Option<String>,
  /// Upstream CSV refreshed by `/update-database`.
  pub source:       Source,
  /// Cap on `recent_incidents`; `None` returns every matching row.
  pub recent_limit: Option<usize>,
}

/// Shared state threaded through all axum handlers.
pub struct AppState<S> {
  pub pipeline: Arc<Pipeline<S>>,
  pub settings: Arc<ApiSettings>,
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self { pipeline: self.pipeline.clone(), settings: self.settings.clone() }
  }
}

impl<S: IncidentStore> AppState<S> {
  pub fn new(pipeline: Arc<Pipeline<S>>, settings: ApiSettings) -> Self {
    Self { pipeline, settings: Arc::new(settings) }
  }

  pub fn store(&self) -> &Arc<S> { self.pipeline.store() }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the service router with permissive CORS and request tracing.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: IncidentStore + 'static,
{
  Router::new()
    .route("/",                get(info))
    .route("/api/stats",       get(stats::handler::<S>))
    .route("/stats",           get(stats::handler::<S>))
    .route("/update-database", get(refresh::handler::<S>))
    .layer(CorsLayer::permissive())
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

async fn info() -> Json<Value> {
  Json(json!({
    "status": "Online",
    "info":   "Use /api/stats for graphics data",
  }))
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use std::{io::Write as _, time::Duration};

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use forcelog_core::{
    incident::{NewIncident, RefreshMode},
    stats::StatsFilter,
  };
  use forcelog_ingest::Fetcher;
  use forcelog_store_sqlite::SqliteStore;
  use tower::ServiceExt as _;

  use super::*;

  const SECRET: &str = "cron-s3cret";

  const DATASET: &str = "\
id,date,name,race,city,state,armed_with,body_camera,age,gender,threat_type,flee_status
1,2020-03-01,Alpha,W,Austin,TX,gun,False,30,male,attack,not
2,2021-07-04,Bravo,B,Dallas,TX,knife,True,41,male,point,foot
3,2019-11-11,Charlie,H,Tacoma,WA,unarmed,False,,female,move,car
,2019-11-12,No Id,W,Tacoma,WA,gun,False,22,male,point,not
";

  fn incident(external_id: i64, race: &str, state: &str) -> NewIncident {
    let mut i = NewIncident::new(external_id);
    i.race = race.to_owned();
    i.state = Some(state.to_owned());
    i
  }

  async fn make_state(source: Source) -> AppState<SqliteStore> {
    let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());
    let pipeline = Pipeline::new(store, Fetcher::new(Duration::from_secs(5)).unwrap());
    AppState::new(Arc::new(pipeline), ApiSettings {
      cron_secret:  Some(SECRET.to_owned()),
      source,
      recent_limit: None,
    })
  }

  /// Four rows: two White, one Black, one with no race.
  async fn seeded_state(source: Source) -> AppState<SqliteStore> {
    let state = make_state(source).await;
    state
      .store()
      .load(RefreshMode::Replace, vec![
        incident(1, "White", "TX"),
        incident(2, "White", "WA"),
        incident(3, "Black", "TX"),
        NewIncident::new(4),
      ])
      .await
      .unwrap();
    state
  }

  async fn get_json(
    state: AppState<SqliteStore>,
    uri: &str,
    auth: Option<&str>,
  ) -> (StatusCode, Value) {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(value) = auth {
      builder = builder.header(header::AUTHORIZATION, value);
    }
    let resp = router(state)
      .oneshot(builder.body(Body::empty()).unwrap())
      .await
      .unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
  }

  fn unreachable() -> Source { Source::from("http://127.0.0.1:1/data.csv") }

  // ── Info ────────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn root_reports_online() {
    let (status, body) = get_json(make_state(unreachable()).await, "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "Online");
    assert_eq!(body["info"], "Use /api/stats for graphics data");
  }

  // ── Stats ───────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn stats_orders_by_count_then_race() {
    let state = seeded_state(unreachable()).await;
    let (status, body) = get_json(state, "/api/stats", None).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.get("error").is_none());
    let stats = body["stats"].as_array().unwrap();
    let races: Vec<_> = stats.iter().map(|s| s["race"].as_str().unwrap()).collect();
    assert_eq!(races, ["White", "Black", "Unknown"]);
    assert_eq!(stats[0]["count"], 2);
    assert_eq!(stats[0]["percentage"], 50.0);
    assert_eq!(stats[2]["percentage"], 25.0);
    assert_eq!(body["recent_incidents"].as_array().unwrap().len(), 4);
  }

  #[tokio::test]
  async fn stats_alias_matches_primary_route() {
    let state = seeded_state(unreachable()).await;
    let (_, primary) = get_json(state.clone(), "/api/stats?state=TX", None).await;
    let (_, alias) = get_json(state, "/stats?state=TX", None).await;
    assert_eq!(primary, alias);
  }

  #[tokio::test]
  async fn stats_filters_by_state() {
    let state = seeded_state(unreachable()).await;
    let (_, body) = get_json(state, "/api/stats?state=TX", None).await;

    let stats = body["stats"].as_array().unwrap();
    assert_eq!(stats.len(), 2);
    assert!(stats.iter().all(|s| s["percentage"] == 50.0));
    let incidents = body["recent_incidents"].as_array().unwrap();
    assert!(incidents.iter().all(|i| i["state"] == "TX"));
  }

  #[tokio::test]
  async fn stats_all_is_the_unfiltered_view() {
    let state = seeded_state(unreachable()).await;
    let (_, explicit) = get_json(state.clone(), "/api/stats?state=All", None).await;
    let (_, implicit) = get_json(state, "/api/stats", None).await;
    assert_eq!(explicit, implicit);
  }

  #[tokio::test]
  async fn stats_state_param_is_trimmed() {
    let state = seeded_state(unreachable()).await;
    let (_, padded) = get_json(state.clone(), "/api/stats?state=%20TX%20", None).await;
    let (_, exact) = get_json(state, "/api/stats?state=TX", None).await;
    assert_eq!(padded, exact);
    assert_eq!(padded["stats"].as_array().unwrap().len(), 2);
  }

  #[tokio::test]
  async fn stats_for_unknown_state_is_empty_not_an_error() {
    let state = seeded_state(unreachable()).await;
    let (status, body) = get_json(state, "/api/stats?state=ZZ", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.get("error").is_none());
    assert_eq!(body["stats"], json!([]));
    assert_eq!(body["recent_incidents"], json!([]));
  }

  #[tokio::test]
  async fn stats_respects_recent_limit() {
    let mut state = seeded_state(unreachable()).await;
    state.settings = Arc::new(ApiSettings { recent_limit: Some(1), ..(*state.settings).clone() });
    let (_, body) = get_json(state, "/api/stats", None).await;
    assert_eq!(body["recent_incidents"].as_array().unwrap().len(), 1);
    assert_eq!(body["stats"][0]["count"], 2);
  }

  // ── Refresh trigger ─────────────────────────────────────────────────────────

  #[tokio::test]
  async fn refresh_rejects_wrong_or_missing_secret() {
    let state = seeded_state(unreachable()).await;

    for auth in [None, Some("Bearer wrong"), Some(SECRET)] {
      let (status, body) = get_json(state.clone(), "/update-database", auth).await;
      assert_eq!(status, StatusCode::UNAUTHORIZED, "auth = {auth:?}");
      assert_eq!(body["status"], "error");
    }
    assert_eq!(state.store().count(&StatsFilter::All).await.unwrap(), 4);
  }

  #[tokio::test]
  async fn refresh_with_secret_replaces_rows() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(DATASET.as_bytes()).unwrap();
    let state = seeded_state(Source::from(file.path().to_path_buf())).await;

    let bearer = format!("Bearer {SECRET}");
    let (status, body) = get_json(state.clone(), "/update-database", Some(&bearer)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["updated_count"], 3);
    assert_eq!(body["skipped_count"], 1);
    assert_eq!(state.store().count(&StatsFilter::All).await.unwrap(), 3);

    let (_, stats) = get_json(state, "/api/stats?state=WA", None).await;
    assert_eq!(stats["stats"][0]["race"], "H");
  }

  #[tokio::test]
  async fn refresh_failure_reports_error_and_keeps_rows() {
    let state = seeded_state(unreachable()).await;
    let bearer = format!("Bearer {SECRET}");
    let (status, body) = get_json(state.clone(), "/update-database", Some(&bearer)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "error");
    assert!(body["message"].is_string());
    assert_eq!(state.store().count(&StatsFilter::All).await.unwrap(), 4);
  }

  #[tokio::test]
  async fn stats_answer_while_upstream_fetch_hangs() {
    let upstream = Router::new().route(
      "/data.csv",
      get(|| async {
        tokio::time::sleep(Duration::from_secs(5)).await;
        "id,race\n1,W\n"
      }),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, upstream).await.unwrap() });

    let seeded = seeded_state(unreachable()).await;
    let pipeline = Pipeline::new(
      seeded.store().clone(),
      Fetcher::new(Duration::from_secs(1)).unwrap(),
    );
    let state = AppState::new(Arc::new(pipeline), ApiSettings {
      source: Source::from(format!("http://{addr}/data.csv")),
      ..(*seeded.settings).clone()
    });

    let trigger = tokio::spawn({
      let state = state.clone();
      let bearer = format!("Bearer {SECRET}");
      async move { get_json(state, "/update-database", Some(&bearer)).await }
    });
    tokio::time::sleep(Duration::from_millis(100)).await;

    let (status, body) = tokio::time::timeout(
      Duration::from_millis(300),
      get_json(state.clone(), "/api/stats", None),
    )
    .await
    .expect("stats blocked behind the refresh");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["recent_incidents"].as_array().unwrap().len(), 4);
    assert!(!trigger.is_finished(), "refresh should still be waiting on upstream");

    let (status, body) = trigger.await.unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "error");
    assert!(body["message"].as_str().unwrap().starts_with("fetch failed"), "{body}");
    assert_eq!(state.store().count(&StatsFilter::All).await.unwrap(), 4);
  }

  #[tokio::test]
  async fn refresh_disabled_without_configured_secret() {
    let mut state = seeded_state(unreachable()).await;
    state.settings = Arc::new(ApiSettings { cron_secret: None, ..(*state.settings).clone() });
    let (status, _) = get_json(state, "/update-database", Some("Bearer None")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
  }
}
