//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Only request rejections live here. Pipeline and store failures are
//! reported inside normal `200` bodies (see the `stats` and `refresh`
//! handlers).

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("unauthorized")]
  Unauthorized,
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = match &self {
      ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
    };
    (status, Json(json!({ "status": "error", "message": self.to_string() }))).into_response()
  }
}
