//! [`SqliteStore`], the SQLite implementation of [`KvStore`].

use std::path::Path;

use foodtree_core::store::KvStore;
use rusqlite::OptionalExtension as _;

use crate::{Error, Result, schema::SCHEMA};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A key-value store backed by a single SQLite file.
///
/// The inner connection is reference-counted, so clones share it.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, used by the tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── KvStore impl ────────────────────────────────────────────────────────────

impl KvStore for SqliteStore {
  type Error = Error;

  async fn get(&self, key: &str) -> Result<Option<String>> {
    let key = key.to_owned();
    let value: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT value FROM kv WHERE key = ?1",
            rusqlite::params![key],
            |row| row.get(0),
          )
          .optional()?)
      })
      .await?;
    Ok(value)
  }

  async fn set(&self, key: &str, value: String) -> Result<()> {
    let key = key.to_owned();
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO kv (key, value) VALUES (?1, ?2)
           ON CONFLICT(key) DO UPDATE SET value = excluded.value",
          rusqlite::params![key, value],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn del(&self, key: &str) -> Result<bool> {
    let key = key.to_owned();
    let removed: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute("DELETE FROM kv WHERE key = ?1", rusqlite::params![key])?)
      })
      .await?;
    Ok(removed > 0)
  }

  /// `GLOB` shares the `*`, `?` and `[...]` syntax of Redis `KEYS`.
  async fn keys(&self, pattern: &str) -> Result<Vec<String>> {
    let pattern = pattern.to_owned();
    let keys = self
      .conn
      .call(move |conn| {
        let mut stmt =
          conn.prepare("SELECT key FROM kv WHERE key GLOB ?1 ORDER BY key")?;
        let rows = stmt
          .query_map(rusqlite::params![pattern], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(keys)
  }

  async fn incr(&self, key: &str) -> Result<i64> {
    let owned = key.to_owned();
    let next = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let current: Option<String> = tx
          .query_row(
            "SELECT value FROM kv WHERE key = ?1",
            rusqlite::params![owned],
            |row| row.get(0),
          )
          .optional()?;

        let next = match current {
          None => Some(1),
          Some(v) => v.trim().parse::<i64>().ok().and_then(|n| n.checked_add(1)),
        };
        let Some(next) = next else {
          return Ok(None);
        };

        tx.execute(
          "INSERT INTO kv (key, value) VALUES (?1, ?2)
           ON CONFLICT(key) DO UPDATE SET value = excluded.value",
          rusqlite::params![owned, next.to_string()],
        )?;
        tx.commit()?;
        Ok(Some(next))
      })
      .await?;

    next.ok_or_else(|| Error::NotAnInteger(key.to_owned()))
  }
}
