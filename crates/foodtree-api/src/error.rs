//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  extract::rejection::{JsonRejection, PathRejection, QueryRejection},
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

pub const UNAUTHORIZED_MESSAGE: &str = "Unauthorized: Admin access required";

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("unauthorized")]
  Unauthorized,

  #[error("not found: {0}")]
  NotFound(String),

  #[error("{0}")]
  BadRequest(String),

  #[error("{0}")]
  Conflict(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("mail error: {0}")]
  Mail(String),
}

impl From<foodtree_core::Error> for ApiError {
  fn from(e: foodtree_core::Error) -> Self {
    use foodtree_core::Error as E;
    match e {
      E::NotFound(key) => ApiError::NotFound(key),
      E::Duplicate(m) => ApiError::Conflict(m),
      E::Invalid(problems) => ApiError::BadRequest(problems.join("; ")),
      e @ E::Profanity { .. } => ApiError::BadRequest(e.to_string()),
      e @ E::InvalidTransition { .. } => ApiError::Conflict(e.to_string()),
      E::Serialization(e) => ApiError::Store(Box::new(e)),
      E::Store(e) => ApiError::Store(e),
    }
  }
}

impl From<JsonRejection> for ApiError {
  fn from(rejection: JsonRejection) -> Self {
    ApiError::BadRequest(rejection.body_text())
  }
}

impl From<QueryRejection> for ApiError {
  fn from(rejection: QueryRejection) -> Self {
    ApiError::BadRequest(rejection.body_text())
  }
}

impl From<PathRejection> for ApiError {
  fn from(rejection: PathRejection) -> Self {
    ApiError::BadRequest(rejection.body_text())
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, UNAUTHORIZED_MESSAGE.to_owned()),
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, format!("Not found: {m}")),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store failure");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
      }
      ApiError::Mail(m) => {
        tracing::error!(error = %m, "mail failure");
        (StatusCode::INTERNAL_SERVER_ERROR, "Failed to send email".to_owned())
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
