//! Bearer-token admin extractor and standalone verifier.
//!
//! Tokens are HS256-signed by the identity provider and carry the signed-in
//! user's `email`. A request is admin iff the token verifies and that email
//! equals the configured admin email.

use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, header, request::Parts};
use foodtree_core::store::KvStore;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

use crate::{AppState, error::ApiError};

/// Settings for verifying admin tokens.
#[derive(Clone)]
pub struct AuthConfig {
  pub admin_email: String,
  /// Shared HS256 secret used by the identity provider.
  pub secret:      String,
}

/// Claims read from an admin token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
  pub email: String,
  pub exp:   usize,
}

/// Present in a handler means the caller is the admin.
pub struct Admin {
  pub email: String,
}

/// Verify the bearer token in `headers`. Returns the admin email.
pub fn verify_admin(headers: &HeaderMap, config: &AuthConfig) -> Result<String, ApiError> {
  if config.admin_email.is_empty() || config.secret.is_empty() {
    return Err(ApiError::Unauthorized);
  }

  let token = headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .and_then(|v| v.strip_prefix("Bearer "))
    .ok_or(ApiError::Unauthorized)?;

  let claims = decode::<Claims>(
    token.trim(),
    &DecodingKey::from_secret(config.secret.as_bytes()),
    &Validation::new(Algorithm::HS256),
  )
  .map_err(|_| ApiError::Unauthorized)?
  .claims;

  if claims.email != config.admin_email {
    return Err(ApiError::Unauthorized);
  }
  Ok(claims.email)
}

impl<S> FromRequestParts<AppState<S>> for Admin
where
  S: KvStore + Clone + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    match verify_admin(&parts.headers, &state.auth) {
      Ok(email) => Ok(Admin { email }),
      Err(e) => {
        tracing::warn!(method = %parts.method, path = %parts.uri.path(), "rejected admin request");
        Err(e)
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use axum::http::HeaderValue;
  use jsonwebtoken::{EncodingKey, Header, encode};

  const SECRET: &str = "test-secret";

  fn config() -> AuthConfig {
    AuthConfig {
      admin_email: "admin@example.com".to_string(),
      secret:      SECRET.to_string(),
    }
  }

  fn token(email: &str, secret: &str, exp_offset: i64) -> String {
    let exp = (chrono::Utc::now().timestamp() + exp_offset) as usize;
    encode(
      &Header::default(),
      &Claims { email: email.to_string(), exp },
      &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
  }

  fn bearer(token: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
      header::AUTHORIZATION,
      HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
    );
    headers
  }

  #[test]
  fn admin_token_is_accepted() {
    let headers = bearer(&token("admin@example.com", SECRET, 3600));
    assert_eq!(verify_admin(&headers, &config()).unwrap(), "admin@example.com");
  }

  #[test]
  fn other_email_is_rejected() {
    let headers = bearer(&token("someone@example.com", SECRET, 3600));
    assert!(matches!(verify_admin(&headers, &config()), Err(ApiError::Unauthorized)));
  }

  #[test]
  fn wrong_secret_is_rejected() {
    let headers = bearer(&token("admin@example.com", "other", 3600));
    assert!(matches!(verify_admin(&headers, &config()), Err(ApiError::Unauthorized)));
  }

  #[test]
  fn expired_token_is_rejected() {
    let headers = bearer(&token("admin@example.com", SECRET, -3600));
    assert!(matches!(verify_admin(&headers, &config()), Err(ApiError::Unauthorized)));
  }

  #[test]
  fn missing_header_is_rejected() {
    assert!(matches!(
      verify_admin(&HeaderMap::new(), &config()),
      Err(ApiError::Unauthorized)
    ));
  }

  #[test]
  fn unconfigured_admin_rejects_everyone() {
    let cfg = AuthConfig {
      admin_email: String::new(),
      secret:      SECRET.to_string(),
    };
    let headers = bearer(&token("", SECRET, 3600));
    assert!(matches!(verify_admin(&headers, &cfg), Err(ApiError::Unauthorized)));
  }
}
