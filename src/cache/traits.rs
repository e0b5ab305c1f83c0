//! Core traits and types for the caching system.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;

/// Failure inside a cache backend. Never leaves the cache layer.
#[derive(Error, Debug)]
pub enum CacheError {
  #[error("Caching is disabled")]
  Disabled,

  #[error("Cache is not connected")]
  NotConnected,

  #[error("Redis error: {0}")]
  Redis(#[from] redis::RedisError),

  #[error("SQLite error: {0}")]
  Sqlite(#[from] rusqlite::Error),

  #[error("IO error: {0}")]
  Io(#[from] std::io::Error),

  #[error("Lock poisoned: {0}")]
  Poisoned(String),
}

pub type CacheResult<T> = std::result::Result<T, CacheError>;

/// A key-value store with per-entry expiry.
///
/// Values are opaque strings; serialization is the caller's concern. Every
/// `set` overwrites the whole entry, so concurrent writers never interleave.
pub trait CacheBackend: Send + Sync {
  /// Short name used in logs.
  fn name(&self) -> &'static str;

  fn connect(&self) -> impl Future<Output = CacheResult<()>> + Send;

  fn disconnect(&self) -> impl Future<Output = CacheResult<()>> + Send;

  /// Fetch a live entry. Expired entries are absent.
  fn get(&self, key: &str) -> impl Future<Output = CacheResult<Option<String>>> + Send;

  fn set(
    &self,
    key: &str,
    value: &str,
    ttl: Duration,
  ) -> impl Future<Output = CacheResult<()>> + Send;

  fn delete(&self, key: &str) -> impl Future<Output = CacheResult<()>> + Send;

  /// Drop every entry in the store.
  fn flush(&self) -> impl Future<Output = CacheResult<()>> + Send;
}
