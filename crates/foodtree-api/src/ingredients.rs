//! Handlers for `/ingredients` endpoints.
//!
//! | Method | Path | Auth | Notes |
//! |--------|------|------|-------|
//! | `GET`  | `/ingredients` | – | Optional `?search=` on name |
//! | `POST` | `/ingredients` | admin | Body: [`NewIngredient`]; 201 |

use axum::{
  Json,
  extract::{
    Query,
    State,
    rejection::{JsonRejection, QueryRejection},
  },
  http::StatusCode,
  response::IntoResponse,
};
use chrono::Utc;
use foodtree_core::{
  ingredient::{self, Ingredient, NewIngredient},
  store::KvStore,
};
use serde::Deserialize;

use crate::{AppState, auth::Admin, error::ApiError};

#[derive(Debug, Deserialize, Default)]
pub struct SearchParams {
  pub search: Option<String>,
}

/// `GET /ingredients[?search=...]`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<Vec<Ingredient>>, ApiError>
where
  S: KvStore + Clone + 'static,
{
  let Query(params) = params?;
  let items =
    ingredient::list_ingredients(state.store.as_ref(), params.search.as_deref()).await?;
  Ok(Json(items))
}

/// `POST /ingredients`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  _admin: Admin,
  body: Result<Json<NewIngredient>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: KvStore + Clone + 'static,
{
  let Json(body) = body?;
  let item = ingredient::create_ingredient(state.store.as_ref(), body, Utc::now()).await?;
  Ok((StatusCode::CREATED, Json(item)))
}
