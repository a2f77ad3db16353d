//! foodtree server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), opens the
//! configured store, and either serves the HTTP API or runs one of the batch
//! maintenance passes and prints its report as JSON.
//!
//! ```text
//! foodtree serve
//! foodtree check
//! foodtree migrate
//! foodtree reset backup.json
//! ```

mod settings;

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use foodtree_api::{AppState, auth::AuthConfig, mail::Mailer};
use foodtree_core::store::KvStore;
use foodtree_store_redis::RedisStore;
use foodtree_store_sqlite::SqliteStore;
use serde::Serialize;
use settings::{ServerConfig, StoreConfig, expand_tilde};
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Food tree submission server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  #[command(subcommand)]
  command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
  /// Serve the HTTP API (the default).
  Serve,
  /// Validate every stored submission and print the report.
  Check,
  /// Rewrite every stored submission into canonical shape.
  Cleanup,
  /// Map legacy source values (`grown`, `gathered`, `prepared`) forward.
  Migrate,
  /// Replace all stored submissions with the JSON array in `file`.
  Reset { file: PathBuf },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();
  let server_cfg = ServerConfig::load(&cli.config)?;
  let command = cli.command.unwrap_or(Command::Serve);

  match server_cfg.store.clone() {
    StoreConfig::Sqlite { path } => {
      let path = expand_tilde(&path);
      let store = SqliteStore::open(&path)
        .await
        .with_context(|| format!("failed to open store at {path:?}"))?;
      run(command, store, server_cfg).await
    }
    StoreConfig::Redis { url } => {
      let store = RedisStore::connect(&url)
        .await
        .context("failed to connect to redis")?;
      run(command, store, server_cfg).await
    }
  }
}

async fn run<S>(command: Command, store: S, server_cfg: ServerConfig) -> anyhow::Result<()>
where
  S: KvStore + Clone + 'static,
{
  let now = chrono::Utc::now();
  match command {
    Command::Serve => serve(store, server_cfg).await,
    Command::Check => print_report(&foodtree_core::check::check_submissions(&store).await?),
    Command::Cleanup => print_report(
      &foodtree_core::cleanup::cleanup_submissions(&store, now).await?,
    ),
    Command::Migrate => print_report(
      &foodtree_core::migrate::migrate_sources(&store, now).await?,
    ),
    Command::Reset { file } => {
      let raw = tokio::fs::read_to_string(&file)
        .await
        .with_context(|| format!("failed to read {file:?}"))?;
      let entries: Vec<serde_json::Value> = serde_json::from_str(&raw)
        .with_context(|| format!("{file:?} is not a JSON array"))?;
      print_report(&foodtree_core::reset::reset_submissions(&store, entries).await?)
    }
  }
}

async fn serve<S>(store: S, server_cfg: ServerConfig) -> anyhow::Result<()>
where
  S: KvStore + Clone + 'static,
{
  if server_cfg.admin_email.is_empty() || server_cfg.auth_secret.is_empty() {
    tracing::warn!("admin_email or auth_secret not set; admin endpoints will reject every request");
  }

  // Build application state.
  let state = AppState {
    store:  Arc::new(store),
    auth:   Arc::new(AuthConfig {
      admin_email: server_cfg.admin_email.clone(),
      secret:      server_cfg.auth_secret.clone(),
    }),
    mailer: Arc::new(Mailer::new(server_cfg.mail.clone())),
  };

  let app = foodtree_api::router(state);
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

fn print_report<T: Serialize>(report: &T) -> anyhow::Result<()> {
  println!("{}", serde_json::to_string_pretty(report)?);
  Ok(())
}
