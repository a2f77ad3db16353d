//! The `KvStore` trait and the key layout used on top of it.
//!
//! The trait is implemented by storage backends (`foodtree-store-sqlite`,
//! `foodtree-store-redis`). Higher layers depend on this abstraction, not on
//! any concrete backend, and receive the store handle explicitly.

use std::future::Future;

// ─── Key layout ──────────────────────────────────────────────────────────────

pub const SUBMISSION_PREFIX: &str = "submission:";
pub const INGREDIENT_PREFIX: &str = "ingredient:";
pub const SUBMISSION_PATTERN: &str = "submission:*";
pub const INGREDIENT_PATTERN: &str = "ingredient:*";
pub const COMPLAINT_COUNTER: &str = "complaint_counter";

/// Storage key for a submission id. Accepts ids with or without the
/// `submission:` prefix.
pub fn submission_key(id: &str) -> String {
  if id.starts_with(SUBMISSION_PREFIX) {
    id.to_owned()
  } else {
    format!("{SUBMISSION_PREFIX}{id}")
  }
}

/// The bare id for a submission key.
pub fn submission_id(key: &str) -> &str {
  key.strip_prefix(SUBMISSION_PREFIX).unwrap_or(key)
}

pub fn ingredient_key(id: &str) -> String {
  format!("{INGREDIENT_PREFIX}{id}")
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// A key-value store over string keys and string (JSON) values.
///
/// Semantics follow Redis: `set` overwrites, `del` reports whether the key
/// existed, `keys` takes a glob pattern (`*`, `?`, `[...]`) and returns keys
/// in no particular order, `incr` treats a missing key as `0`.
///
/// There are no multi-key transactions. Batch operations built on top of this
/// trait are last-write-wins per key.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait KvStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn get(
    &self,
    key: &str,
  ) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send;

  fn set(
    &self,
    key: &str,
    value: String,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send;

  /// Remove `key`. Returns `true` if it existed.
  fn del(
    &self,
    key: &str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send;

  fn keys(
    &self,
    pattern: &str,
  ) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send;

  /// Atomically increment the integer stored at `key` and return the result.
  fn incr(
    &self,
    key: &str,
  ) -> impl Future<Output = Result<i64, Self::Error>> + Send;
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn submission_key_adds_prefix_once() {
    assert_eq!(submission_key("abc"), "submission:abc");
    assert_eq!(submission_key("submission:abc"), "submission:abc");
  }

  #[test]
  fn submission_id_strips_prefix() {
    assert_eq!(submission_id("submission:abc"), "abc");
    assert_eq!(submission_id("abc"), "abc");
  }
}
