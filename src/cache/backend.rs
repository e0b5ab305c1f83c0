//! Backend selection by configuration.

use std::time::Duration;

use crate::config::{CacheBackendKind, CacheConfig};

use super::redis_backend::RedisBackend;
use super::storage::{MemoryBackend, SqliteBackend};
use super::traits::{CacheBackend, CacheError, CacheResult};

/// The configured cache store. Enum dispatch keeps the layer non-generic at
/// the server boundary.
pub enum Backend {
  Redis(RedisBackend),
  Sqlite(SqliteBackend),
  Memory(MemoryBackend),
  /// Caching turned off; every operation fails with [`CacheError::Disabled`].
  Disabled,
}

impl Backend {
  pub fn from_config(config: &CacheConfig) -> Self {
    match config.backend {
      CacheBackendKind::Redis => Self::Redis(RedisBackend::new(config.redis_url.clone())),
      CacheBackendKind::Sqlite => match config
        .sqlite_path
        .clone()
        .or_else(SqliteBackend::default_path)
      {
        Some(path) => Self::Sqlite(SqliteBackend::new(path)),
        None => {
          tracing::warn!("Could not determine a data directory for the SQLite cache");
          Self::Disabled
        }
      },
      CacheBackendKind::Memory => Self::Memory(MemoryBackend::new()),
      CacheBackendKind::None => Self::Disabled,
    }
  }
}

impl CacheBackend for Backend {
  fn name(&self) -> &'static str {
    match self {
      Self::Redis(b) => b.name(),
      Self::Sqlite(b) => b.name(),
      Self::Memory(b) => b.name(),
      Self::Disabled => "none",
    }
  }

  async fn connect(&self) -> CacheResult<()> {
    match self {
      Self::Redis(b) => b.connect().await,
      Self::Sqlite(b) => b.connect().await,
      Self::Memory(b) => b.connect().await,
      Self::Disabled => Err(CacheError::Disabled),
    }
  }

  async fn disconnect(&self) -> CacheResult<()> {
    match self {
      Self::Redis(b) => b.disconnect().await,
      Self::Sqlite(b) => b.disconnect().await,
      Self::Memory(b) => b.disconnect().await,
      Self::Disabled => Ok(()),
    }
  }

  async fn get(&self, key: &str) -> CacheResult<Option<String>> {
    match self {
      Self::Redis(b) => b.get(key).await,
      Self::Sqlite(b) => b.get(key).await,
      Self::Memory(b) => b.get(key).await,
      Self::Disabled => Err(CacheError::Disabled),
    }
  }

  async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
    match self {
      Self::Redis(b) => b.set(key, value, ttl).await,
      Self::Sqlite(b) => b.set(key, value, ttl).await,
      Self::Memory(b) => b.set(key, value, ttl).await,
      Self::Disabled => Err(CacheError::Disabled),
    }
  }

  async fn delete(&self, key: &str) -> CacheResult<()> {
    match self {
      Self::Redis(b) => b.delete(key).await,
      Self::Sqlite(b) => b.delete(key).await,
      Self::Memory(b) => b.delete(key).await,
      Self::Disabled => Err(CacheError::Disabled),
    }
  }

  async fn flush(&self) -> CacheResult<()> {
    match self {
      Self::Redis(b) => b.flush().await,
      Self::Sqlite(b) => b.flush().await,
      Self::Memory(b) => b.flush().await,
      Self::Disabled => Err(CacheError::Disabled),
    }
  }
}
