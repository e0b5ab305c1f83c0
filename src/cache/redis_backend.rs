//! Redis cache backend.

use std::sync::RwLock;
use std::time::Duration;

use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use super::traits::{CacheBackend, CacheError, CacheResult};

/// Redis-backed store using `SET .. EX` for expiry.
///
/// The connection manager reconnects on its own after the initial connect,
/// so transient outages show up as per-call errors rather than a dead client.
pub struct RedisBackend {
  url: String,
  conn: RwLock<Option<ConnectionManager>>,
}

impl RedisBackend {
  pub fn new(url: impl Into<String>) -> Self {
    Self {
      url: url.into(),
      conn: RwLock::new(None),
    }
  }

  /// Clone the live connection out of the lock.
  fn connection(&self) -> CacheResult<ConnectionManager> {
    self
      .conn
      .read()
      .map_err(|e| CacheError::Poisoned(e.to_string()))?
      .clone()
      .ok_or(CacheError::NotConnected)
  }
}

impl CacheBackend for RedisBackend {
  fn name(&self) -> &'static str {
    "redis"
  }

  async fn connect(&self) -> CacheResult<()> {
    let client = redis::Client::open(self.url.as_str())?;
    let manager = ConnectionManager::new(client).await?;

    *self
      .conn
      .write()
      .map_err(|e| CacheError::Poisoned(e.to_string()))? = Some(manager);

    Ok(())
  }

  async fn disconnect(&self) -> CacheResult<()> {
    self
      .conn
      .write()
      .map_err(|e| CacheError::Poisoned(e.to_string()))?
      .take();
    Ok(())
  }

  async fn get(&self, key: &str) -> CacheResult<Option<String>> {
    let mut conn = self.connection()?;
    let value: Option<String> = conn.get(key).await?;
    Ok(value)
  }

  async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
    let mut conn = self.connection()?;
    // EX 0 is rejected by Redis.
    let seconds = ttl.as_secs().max(1);
    let _: () = conn.set_ex(key, value, seconds).await?;
    Ok(())
  }

  async fn delete(&self, key: &str) -> CacheResult<()> {
    let mut conn = self.connection()?;
    let _: () = conn.del(key).await?;
    Ok(())
  }

  async fn flush(&self) -> CacheResult<()> {
    let mut conn = self.connection()?;
    let _: () = redis::cmd("FLUSHDB").query_async(&mut conn).await?;
    Ok(())
  }
}
