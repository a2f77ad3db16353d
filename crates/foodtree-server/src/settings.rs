//! Runtime configuration, read from an optional TOML file overlaid with
//! `FOODTREE_*` environment variables.
//!
//! ```toml
//! host        = "0.0.0.0"
//! port        = 8080
//! admin_email = "admin@example.com"
//! auth_secret = "..."
//!
//! [store]
//! backend = "redis"
//! url     = "redis://127.0.0.1:6379"
//! ```
//!
//! Nested keys use a double underscore in the environment, e.g.
//! `FOODTREE_STORE__BACKEND=sqlite` and `FOODTREE_STORE__PATH=foodtree.db`.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use foodtree_api::mail::MailConfig;
use serde::Deserialize;

/// Where submissions are stored.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum StoreConfig {
  Sqlite { path: PathBuf },
  Redis { url: String },
}

impl Default for StoreConfig {
  fn default() -> Self {
    Self::Sqlite {
      path: PathBuf::from("foodtree.db"),
    }
  }
}

fn default_host() -> String { "127.0.0.1".to_string() }

fn default_port() -> u16 { 8080 }

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:        String,
  #[serde(default = "default_port")]
  pub port:        u16,
  #[serde(default)]
  pub store:       StoreConfig,
  /// Only a token for this email is admin. Empty disables admin access.
  #[serde(default)]
  pub admin_email: String,
  /// HS256 secret shared with the identity provider.
  #[serde(default)]
  pub auth_secret: String,
  /// Contact-form delivery; messages are only logged when absent.
  #[serde(default)]
  pub mail:        Option<MailConfig>,
}

impl ServerConfig {
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(
        config::Environment::with_prefix("FOODTREE")
          .prefix_separator("_")
          .separator("__"),
      )
      .build()
      .context("failed to read config file")?;

    settings
      .try_deserialize()
      .context("failed to deserialise ServerConfig")
  }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
