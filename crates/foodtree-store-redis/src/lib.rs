//! Redis backend for the food tree key-value store.
//!
//! This is the production store: submissions, catalogue ingredients and the
//! complaint counter live as plain string keys on a remote Redis server.

mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::RedisStore;

#[cfg(test)]
mod tests;
