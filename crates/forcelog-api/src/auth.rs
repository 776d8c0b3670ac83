//! Shared-secret check for the refresh trigger.
//!
//! The scheduler calling `/update-database` presents
//! `Authorization: Bearer <secret>`. The comparison is constant-time.

use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header, request::Parts},
};
use forcelog_core::store::IncidentStore;
use subtle::ConstantTimeEq as _;
use tracing::warn;

use crate::{AppState, error::ApiError};

/// Marker extractor: present in a handler means the caller held the secret.
pub struct CronAuthorized;

/// Check `headers` against `secret`. With no secret configured every request
/// is rejected.
pub fn verify_bearer(headers: &HeaderMap, secret: Option<&str>) -> Result<(), ApiError> {
  let secret = secret.filter(|s| !s.is_empty()).ok_or(ApiError::Unauthorized)?;

  let presented = headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .and_then(|v| v.strip_prefix("Bearer "))
    .ok_or(ApiError::Unauthorized)?;

  if bool::from(presented.as_bytes().ct_eq(secret.as_bytes())) {
    Ok(())
  } else {
    Err(ApiError::Unauthorized)
  }
}

impl<S> FromRequestParts<AppState<S>> for CronAuthorized
where
  S: IncidentStore + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    verify_bearer(&parts.headers, state.settings.cron_secret.as_deref()).inspect_err(|_| {
      warn!(uri = %parts.uri, "rejected refresh trigger without valid secret");
    })?;
    Ok(CronAuthorized)
  }
}

#[cfg(test)]
mod tests {
  use axum::http::HeaderValue;

  use super::*;

  fn headers(value: &str) -> HeaderMap {
    let mut h = HeaderMap::new();
    h.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
    h
  }

  #[test]
  fn correct_secret() {
    assert!(verify_bearer(&headers("Bearer s3cret"), Some("s3cret")).is_ok());
  }

  #[test]
  fn wrong_secret() {
    assert!(matches!(
      verify_bearer(&headers("Bearer nope"), Some("s3cret")),
      Err(ApiError::Unauthorized)
    ));
  }

  #[test]
  fn secret_without_bearer_prefix() {
    assert!(verify_bearer(&headers("s3cret"), Some("s3cret")).is_err());
    assert!(verify_bearer(&headers("Basic s3cret"), Some("s3cret")).is_err());
  }

  #[test]
  fn missing_header() {
    assert!(verify_bearer(&HeaderMap::new(), Some("s3cret")).is_err());
  }

  #[test]
  fn unconfigured_secret_rejects_everything() {
    assert!(verify_bearer(&headers("Bearer None"), None).is_err());
    assert!(verify_bearer(&headers("Bearer "), Some("")).is_err());
  }
}
