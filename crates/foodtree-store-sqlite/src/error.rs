//! Error type for `foodtree-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  /// `incr` hit a value that is not an integer.
  #[error("value at {0} is not an integer")]
  NotAnInteger(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
