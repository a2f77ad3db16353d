//! Core types and operations for the food tree submission store.
//!
//! This crate has no HTTP or database dependencies. Storage
//! backends implement [`store::KvStore`]; the HTTP layer and the server binary
//! drive the operations in [`repo`], [`check`], [`cleanup`], [`migrate`] and
//! [`reset`] against any such backend.

pub mod check;
pub mod cleanup;
pub mod error;
pub mod ingredient;
pub mod lifecycle;
pub mod migrate;
pub mod profanity;
pub mod repo;
pub mod reset;
pub mod source;
pub mod store;
pub mod submission;

pub use error::{Error, Result};

use chrono::{DateTime, SecondsFormat, Utc};

/// Author recorded on every submission. The site has a single author, so
/// submitter identity is pinned rather than taken from the request.
pub const SITE_AUTHOR: &str = "Jose Maria Barbeito";

/// Render a timestamp the way records store it: RFC 3339, millisecond
/// precision, `Z` suffix (e.g. `2024-03-01T12:00:00.000Z`).
pub fn timestamp(at: DateTime<Utc>) -> String {
  at.to_rfc3339_opts(SecondsFormat::Millis, true)
}
