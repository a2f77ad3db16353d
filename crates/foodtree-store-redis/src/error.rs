//! Error type for `foodtree-store-redis`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("redis error: {0}")]
  Redis(#[from] redis::RedisError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
