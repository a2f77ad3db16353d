//! Handlers for the complaint counter: `GET /complaints` and
//! `POST /complaints`, both returning `{"count": n}`.

use axum::{Json, extract::State};
use foodtree_core::{repo, store::KvStore};
use serde_json::{Value, json};

use crate::{AppState, error::ApiError};

pub async fn count<S>(State(state): State<AppState<S>>) -> Result<Json<Value>, ApiError>
where
  S: KvStore + Clone + 'static,
{
  let count = repo::complaint_count(state.store.as_ref()).await?;
  Ok(Json(json!({ "count": count })))
}

pub async fn increment<S>(State(state): State<AppState<S>>) -> Result<Json<Value>, ApiError>
where
  S: KvStore + Clone + 'static,
{
  let count = repo::record_complaint(state.store.as_ref()).await?;
  Ok(Json(json!({ "count": count })))
}
