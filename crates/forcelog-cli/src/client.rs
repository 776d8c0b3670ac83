//! Async HTTP client wrapping the forcelog JSON API.

use anyhow::{Context, Result, anyhow};
use forcelog_core::stats::StatsReport;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

/// Connection settings for the forcelog API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url:    String,
  pub cron_secret: String,
}

/// Body of `/update-database`, success or failure.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RefreshOutcome {
  pub status:        String,
  #[serde(default)]
  pub updated_count: Option<u64>,
  #[serde(default)]
  pub skipped_count: Option<u64>,
  #[serde(default)]
  pub message:       Option<String>,
}

/// Async HTTP client for the forcelog JSON API.
///
/// Cheap to clone: the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self> {
    // A refresh downloads and reloads the whole dataset.
    let client = Client::builder()
      .timeout(Duration::from_secs(300))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
  }

  /// `GET /api/stats[?state=XX]`
  ///
  /// A body carrying `error` is returned as an `Err`.
  pub async fn stats(&self, state: Option<&str>) -> Result<StatsReport> {
    let mut req = self.client.get(self.url("/api/stats"));
    if let Some(state) = state {
      req = req.query(&[("state", state)]);
    }
    let resp = req.send().await.context("GET /api/stats failed")?;

    if !resp.status().is_success() {
      return Err(anyhow!("GET /api/stats → {}", resp.status()));
    }
    let report: StatsReport = resp.json().await.context("deserialising stats")?;
    match report.error {
      Some(e) => Err(anyhow!("server could not compute stats: {e}")),
      None => Ok(report),
    }
  }

  /// `GET /update-database` with the bearer secret.
  pub async fn refresh(&self) -> Result<RefreshOutcome> {
    let resp = self
      .client
      .get(self.url("/update-database"))
      .bearer_auth(&self.config.cron_secret)
      .send()
      .await
      .context("GET /update-database failed")?;

    match resp.status() {
      StatusCode::UNAUTHORIZED => Err(anyhow!("server rejected the cron secret")),
      s if !s.is_success() => Err(anyhow!("GET /update-database → {s}")),
      _ => resp.json().await.context("deserialising refresh result"),
    }
  }
}

#[cfg(test)]
mod tests {
  use axum::{
    Json, Router,
    http::{HeaderMap, StatusCode as AxumStatus},
    routing::get,
  };
  use serde_json::json;

  use super::*;

  async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
    format!("http://{addr}")
  }

  fn client(base_url: String) -> ApiClient {
    ApiClient::new(ApiConfig { base_url, cron_secret: "s3cret".into() }).unwrap()
  }

  #[tokio::test]
  async fn stats_decodes_report() {
    let app = Router::new().route(
      "/api/stats",
      get(|| async {
        Json(json!({
          "stats": [{ "race": "W", "count": 3, "percentage": 100.0 }],
          "recent_incidents": [],
        }))
      }),
    );
    let report = client(serve(app).await).stats(Some("WA")).await.unwrap();
    assert_eq!(report.stats.len(), 1);
    assert_eq!(report.stats[0].count, 3);
  }

  #[tokio::test]
  async fn stats_error_body_is_an_error() {
    let app = Router::new().route(
      "/api/stats",
      get(|| async { Json(json!({ "error": "db down", "stats": [], "recent_incidents": [] })) }),
    );
    let err = client(serve(app).await).stats(None).await.unwrap_err();
    assert!(err.to_string().contains("db down"));
  }

  #[tokio::test]
  async fn refresh_sends_bearer_secret() {
    let app = Router::new().route(
      "/update-database",
      get(|headers: HeaderMap| async move {
        if headers.get("authorization").and_then(|v| v.to_str().ok()) == Some("Bearer s3cret") {
          (AxumStatus::OK, Json(json!({ "status": "success", "updated_count": 7, "skipped_count": 1 })))
        } else {
          (AxumStatus::UNAUTHORIZED, Json(json!({ "status": "error", "message": "unauthorized" })))
        }
      }),
    );
    let base = serve(app).await;

    let outcome = client(base.clone()).refresh().await.unwrap();
    assert_eq!(outcome.status, "success");
    assert_eq!(outcome.updated_count, Some(7));

    let wrong = ApiClient::new(ApiConfig { base_url: base, cron_secret: "nope".into() }).unwrap();
    assert!(wrong.refresh().await.is_err());
  }
}
