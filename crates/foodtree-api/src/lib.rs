//! JSON HTTP API for the food tree.
//!
//! Exposes an axum [`Router`] backed by any [`foodtree_core::store::KvStore`].
//! Public endpoints accept submissions, list ingredients and take contact and
//! complaint traffic; admin endpoints require a bearer token whose `email`
//! claim matches the configured admin (see [`auth`]).
//!
//! # Mounting
//!
//! ```rust,ignore
//! axum::serve(listener, foodtree_api::router(state)).await?;
//! ```

pub mod admin;
pub mod auth;
pub mod complaints;
pub mod contact;
pub mod error;
pub mod ingredients;
pub mod mail;
pub mod submissions;

use std::sync::Arc;

use axum::{
  Json,
  Router,
  http::Method,
  routing::{get, post},
};
use foodtree_core::store::KvStore;
use serde_json::{Value, json};
use tower_http::{
  cors::{Any, CorsLayer},
  trace::TraceLayer,
};

pub use error::ApiError;

use auth::AuthConfig;
use mail::Mailer;

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: KvStore> {
  pub store:  Arc<S>,
  pub auth:   Arc<AuthConfig>,
  pub mailer: Arc<Mailer>,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Any origin may call the API.
fn cors_layer() -> CorsLayer {
  CorsLayer::new()
    .allow_origin(Any)
    .allow_methods([
      Method::GET,
      Method::POST,
      Method::PATCH,
      Method::DELETE,
      Method::OPTIONS,
    ])
    .allow_headers(Any)
}

async fn health() -> Json<Value> { Json(json!({ "status": "ok" })) }

/// Build the API router for `state`.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: KvStore + Clone + 'static,
{
  Router::new()
    .route("/health", get(health))
    // Submissions
    .route(
      "/submissions",
      get(submissions::list::<S>).post(submissions::create::<S>),
    )
    .route(
      "/submissions/{id}",
      get(submissions::get_one::<S>)
        .patch(submissions::decide::<S>)
        .delete(submissions::delete_one::<S>),
    )
    // Ingredients
    .route(
      "/ingredients",
      get(ingredients::list::<S>).post(ingredients::create::<S>),
    )
    // Admin maintenance
    .route("/admin/check-submissions",   get(admin::check::<S>))
    .route("/admin/cleanup-submissions", post(admin::cleanup::<S>))
    .route("/admin/migrate",             post(admin::migrate::<S>))
    .route("/admin/reset",               post(admin::reset::<S>))
    // Site forms
    .route(
      "/complaints",
      get(complaints::count::<S>).post(complaints::increment::<S>),
    )
    .route("/contact", post(contact::send::<S>))
    .layer(cors_layer())
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}
