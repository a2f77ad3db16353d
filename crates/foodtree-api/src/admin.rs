//! Admin maintenance endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/admin/check-submissions` | Read-only validation report |
//! | `POST` | `/admin/cleanup-submissions` | Rewrite every submission into canonical shape |
//! | `POST` | `/admin/migrate` | Map legacy source values forward |
//! | `POST` | `/admin/reset` | Body: JSON array of submissions to store instead |
//!
//! All of them require an admin token; a rejected request never reaches the
//! store.

use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
};
use chrono::Utc;
use foodtree_core::{
  check::{self, CheckReport},
  cleanup::{self, CleanupReport},
  migrate::{self, MigrationReport},
  reset::{self, ResetReport},
  store::KvStore,
};
use serde_json::Value;

use crate::{AppState, auth::Admin, error::ApiError};

/// `GET /admin/check-submissions`
pub async fn check<S>(
  State(state): State<AppState<S>>,
  _admin: Admin,
) -> Result<Json<CheckReport>, ApiError>
where
  S: KvStore + Clone + 'static,
{
  Ok(Json(check::check_submissions(state.store.as_ref()).await?))
}

/// `POST /admin/cleanup-submissions`
pub async fn cleanup<S>(
  State(state): State<AppState<S>>,
  _admin: Admin,
) -> Result<Json<CleanupReport>, ApiError>
where
  S: KvStore + Clone + 'static,
{
  Ok(Json(cleanup::cleanup_submissions(state.store.as_ref(), Utc::now()).await?))
}

/// `POST /admin/migrate`
pub async fn migrate<S>(
  State(state): State<AppState<S>>,
  admin: Admin,
) -> Result<Json<MigrationReport>, ApiError>
where
  S: KvStore + Clone + 'static,
{
  tracing::info!(by = %admin.email, "source migration requested");
  Ok(Json(migrate::migrate_sources(state.store.as_ref(), Utc::now()).await?))
}

/// `POST /admin/reset`
pub async fn reset<S>(
  State(state): State<AppState<S>>,
  admin: Admin,
  body: Result<Json<Vec<Value>>, JsonRejection>,
) -> Result<Json<ResetReport>, ApiError>
where
  S: KvStore + Clone + 'static,
{
  let Json(entries) = body?;
  tracing::warn!(by = %admin.email, entries = entries.len(), "resetting submissions");
  Ok(Json(reset::reset_submissions(state.store.as_ref(), entries).await?))
}
