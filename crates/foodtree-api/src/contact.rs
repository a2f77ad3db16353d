//! Handler for `POST /contact`.

use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
};
use foodtree_core::{profanity::sanitize_text, store::KvStore};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{AppState, error::ApiError, mail::ContactMessage};

#[derive(Debug, Deserialize, Default)]
pub struct ContactBody {
  #[serde(default)]
  pub name:    String,
  #[serde(default)]
  pub email:   String,
  #[serde(default)]
  pub subject: String,
  #[serde(default)]
  pub message: String,
}

/// `POST /contact` with body `{"name","email","subject","message"}`, all
/// required. Subject and message are sanitized before delivery.
pub async fn send<S>(
  State(state): State<AppState<S>>,
  body: Result<Json<ContactBody>, JsonRejection>,
) -> Result<Json<Value>, ApiError>
where
  S: KvStore + Clone + 'static,
{
  let Json(body) = body?;
  let fields = [&body.name, &body.email, &body.subject, &body.message];
  if fields.iter().any(|f| f.trim().is_empty()) {
    return Err(ApiError::BadRequest("Missing required fields".to_owned()));
  }

  let msg = ContactMessage {
    name:    body.name.trim().to_owned(),
    email:   body.email.trim().to_owned(),
    subject: sanitize_text(&body.subject),
    message: sanitize_text(&body.message),
  };
  state.mailer.send(&msg).await?;

  Ok(Json(json!({ "success": true, "message": "Email sent successfully" })))
}
