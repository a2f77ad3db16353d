//! Error types for `foodtree-core`.

use thiserror::Error;

use crate::lifecycle::SubmissionStatus;

#[derive(Debug, Error)]
pub enum Error {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("{0}")]
  Duplicate(String),

  /// The submission failed one or more content rules; one message per rule.
  #[error("invalid submission: {}", .0.join("; "))]
  Invalid(Vec<String>),

  #[error("{field} contains inappropriate language")]
  Profanity { field: &'static str },

  #[error("cannot move a submission from {from} to {to}")]
  InvalidTransition {
    from: SubmissionStatus,
    to:   SubmissionStatus,
  },

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Wrap a backend error from a [`crate::store::KvStore`] call.
  pub fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
