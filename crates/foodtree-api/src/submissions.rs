//! Handlers for `/submissions` endpoints.
//!
//! | Method   | Path | Auth | Notes |
//! |----------|------|------|-------|
//! | `GET`    | `/submissions` | admin | Optional `?type=`, `?status=`, `?search=`; newest first |
//! | `POST`   | `/submissions` | – | Body: `{"type":"ingredient","data":{...}}`; 201 |
//! | `GET`    | `/submissions/{id}` | admin | 404 if not found |
//! | `PATCH`  | `/submissions/{id}` | admin | Body: `{"status":"approved","notes":"..."}` |
//! | `DELETE` | `/submissions/{id}` | admin | `{"success":true}` |

use axum::{
  Json,
  extract::{
    Path,
    Query,
    State,
    rejection::{JsonRejection, PathRejection, QueryRejection},
  },
  http::StatusCode,
  response::IntoResponse,
};
use chrono::Utc;
use foodtree_core::{
  lifecycle::SubmissionStatus,
  repo::{self, SubmissionFilter},
  store::KvStore,
  submission::{NewSubmission, SubmissionRecord},
};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{AppState, auth::Admin, error::ApiError};

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /submissions[?type=...][&status=...][&search=...]`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  _admin: Admin,
  filter: Result<Query<SubmissionFilter>, QueryRejection>,
) -> Result<Json<Vec<SubmissionRecord>>, ApiError>
where
  S: KvStore + Clone + 'static,
{
  let Query(filter) = filter?;
  let records = repo::list_submissions(state.store.as_ref(), &filter).await?;
  Ok(Json(records))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /submissions`. Public.
pub async fn create<S>(
  State(state): State<AppState<S>>,
  body: Result<Json<NewSubmission>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: KvStore + Clone + 'static,
{
  let Json(body) = body?;
  let record = repo::create_submission(state.store.as_ref(), body, Utc::now()).await?;
  Ok((StatusCode::CREATED, Json(record)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /submissions/{id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  _admin: Admin,
  id: Result<Path<String>, PathRejection>,
) -> Result<Json<SubmissionRecord>, ApiError>
where
  S: KvStore + Clone + 'static,
{
  let Path(id) = id?;
  let record = repo::get_submission(state.store.as_ref(), &id).await?;
  Ok(Json(record))
}

// ─── Decide ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct DecisionBody {
  pub status: SubmissionStatus,
  #[serde(default)]
  pub notes:  Option<String>,
}

/// `PATCH /submissions/{id}`: approve or reject a pending submission.
pub async fn decide<S>(
  State(state): State<AppState<S>>,
  admin: Admin,
  id: Result<Path<String>, PathRejection>,
  body: Result<Json<DecisionBody>, JsonRejection>,
) -> Result<Json<SubmissionRecord>, ApiError>
where
  S: KvStore + Clone + 'static,
{
  let Path(id) = id?;
  let Json(body) = body?;
  let record =
    repo::decide_submission(state.store.as_ref(), &id, body.status, body.notes, Utc::now())
      .await?;
  tracing::debug!(%id, by = %admin.email, "submission decided");
  Ok(Json(record))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /submissions/{id}`. Accepts ids with or without the
/// `submission:` prefix.
pub async fn delete_one<S>(
  State(state): State<AppState<S>>,
  _admin: Admin,
  id: Result<Path<String>, PathRejection>,
) -> Result<Json<Value>, ApiError>
where
  S: KvStore + Clone + 'static,
{
  let Path(id) = id?;
  repo::delete_submission(state.store.as_ref(), &id).await?;
  Ok(Json(json!({ "success": true })))
}
