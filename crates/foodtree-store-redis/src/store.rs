//! [`RedisStore`], the Redis implementation of [`KvStore`].

use foodtree_core::store::KvStore;
use redis::{
  AsyncCommands as _,
  Client,
  aio::{ConnectionManager, ConnectionManagerConfig},
};

use crate::{Error, Result};

/// A key-value store on a remote Redis server.
///
/// The connection manager reconnects on its own; each call works on a cheap
/// clone of it. Requests are not retried beyond that single reconnect.
#[derive(Clone)]
pub struct RedisStore {
  conn: ConnectionManager,
}

impl RedisStore {
  /// Connect to the server at `url` (e.g. `redis://127.0.0.1:6379`).
  pub async fn connect(url: &str) -> Result<Self> {
    let config = ConnectionManagerConfig::new().set_number_of_retries(1);
    let client = Client::open(url)?;
    let conn = client.get_connection_manager_with_config(config).await?;
    tracing::info!("connected to redis");
    Ok(Self { conn })
  }
}

impl KvStore for RedisStore {
  type Error = Error;

  async fn get(&self, key: &str) -> Result<Option<String>> {
    let mut conn = self.conn.clone();
    Ok(conn.get::<_, Option<String>>(key).await?)
  }

  async fn set(&self, key: &str, value: String) -> Result<()> {
    let mut conn = self.conn.clone();
    conn.set::<_, _, ()>(key, value).await?;
    Ok(())
  }

  async fn del(&self, key: &str) -> Result<bool> {
    let mut conn = self.conn.clone();
    let removed: i64 = conn.del(key).await?;
    Ok(removed > 0)
  }

  async fn keys(&self, pattern: &str) -> Result<Vec<String>> {
    let mut conn = self.conn.clone();
    Ok(conn.keys::<_, Vec<String>>(pattern).await?)
  }

  async fn incr(&self, key: &str) -> Result<i64> {
    let mut conn = self.conn.clone();
    Ok(conn.incr::<_, _, i64>(key, 1).await?)
  }
}
