//! Cache layer that orchestrates caching logic with upstream fetching.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info, warn};

use super::traits::{CacheBackend, CacheError, CacheResult};

/// How long to wait for a backend to come up before running without it.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default deadline for a single get/set/delete/flush.
const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(2);

/// Infallible adapter around a cache backend.
///
/// Every backend failure is logged and downgraded: reads become misses and
/// writes are dropped. An operation that outlives its deadline counts as a
/// failure. Until `connect` succeeds the layer is degraded and skips the
/// backend entirely.
pub struct CacheLayer<B: CacheBackend> {
  backend: Arc<B>,
  connected: Arc<AtomicBool>,
  disabled: Arc<AtomicBool>,
  timeout: Duration,
}

impl<B: CacheBackend> CacheLayer<B> {
  /// Create a new, not yet connected, cache layer.
  pub fn new(backend: B) -> Self {
    Self {
      backend: Arc::new(backend),
      connected: Arc::new(AtomicBool::new(false)),
      disabled: Arc::new(AtomicBool::new(false)),
      timeout: DEFAULT_OPERATION_TIMEOUT,
    }
  }

  /// Bound every backend operation by `timeout`.
  pub fn with_timeout(mut self, timeout: Duration) -> Self {
    self.timeout = timeout;
    self
  }

  pub fn is_connected(&self) -> bool {
    self.connected.load(Ordering::SeqCst)
  }

  #[cfg(test)]
  pub fn backend(&self) -> &B {
    &self.backend
  }

  /// Whether the backend reported caching as switched off.
  pub fn is_disabled(&self) -> bool {
    self.disabled.load(Ordering::SeqCst)
  }

  /// Connect the backend. Returns whether the cache is usable.
  pub async fn connect(&self) -> bool {
    if self.is_connected() {
      return true;
    }

    let backend = self.backend.name();
    match tokio::time::timeout(CONNECT_TIMEOUT, self.backend.connect()).await {
      Ok(Ok(())) => {
        info!(backend, "Cache connected");
        self.connected.store(true, Ordering::SeqCst);
      }
      Ok(Err(CacheError::Disabled)) => {
        info!("Caching disabled");
        self.disabled.store(true, Ordering::SeqCst);
      }
      Ok(Err(e)) => warn!(backend, error = %e, "Failed to connect cache, operating without it"),
      Err(_) => warn!(backend, "Timed out connecting cache, operating without it"),
    }

    self.is_connected()
  }

  pub async fn disconnect(&self) {
    if !self.connected.swap(false, Ordering::SeqCst) {
      return;
    }
    if let Err(e) = self.backend.disconnect().await {
      warn!(backend = self.backend.name(), error = %e, "Error disconnecting cache");
    }
  }

  /// Whether an operation may reach the backend. Logs the skip otherwise.
  fn usable(&self, op: &str, key: &str) -> bool {
    if self.is_connected() {
      return true;
    }
    if self.is_disabled() {
      debug!(key, "Caching disabled, skipping {}", op);
    } else {
      warn!(key, "Cache not connected, skipping {}", op);
    }
    false
  }

  /// Run one backend operation under the deadline. `None` on any failure.
  async fn guarded<T>(
    &self,
    op: &str,
    key: &str,
    operation: impl Future<Output = CacheResult<T>>,
  ) -> Option<T> {
    match tokio::time::timeout(self.timeout, operation).await {
      Ok(Ok(value)) => Some(value),
      Ok(Err(e)) => {
        warn!(key, error = %e, "Cache {} failed", op);
        None
      }
      Err(_) => {
        warn!(key, timeout_ms = self.timeout.as_millis() as u64, "Cache {} timed out", op);
        None
      }
    }
  }

  /// Read a key. Any failure is a miss.
  pub async fn get(&self, key: &str) -> Option<String> {
    if !self.usable("get", key) {
      return None;
    }
    self.guarded("get", key, self.backend.get(key)).await.flatten()
  }

  /// Write a key, best-effort.
  pub async fn set(&self, key: &str, value: &str, ttl: Duration) {
    if self.usable("set", key) {
      self.guarded("set", key, self.backend.set(key, value, ttl)).await;
    }
  }

  pub async fn delete(&self, key: &str) {
    if self.usable("delete", key) {
      self.guarded("delete", key, self.backend.delete(key)).await;
    }
  }

  pub async fn flush(&self) {
    if self.usable("flush", "*") {
      self.guarded("flush", "*", self.backend.flush()).await;
    }
  }

  /// Cache-aside fetch.
  ///
  /// 1. Return the cached value if it parses as `T`
  /// 2. Otherwise call `fetcher` once for the raw upstream body
  /// 3. Parse it, substituting `T::default()` when the body is malformed
  /// 4. Store the result under `key` for `ttl` and return it
  ///
  /// Only the fetcher's error is ever returned.
  pub async fn fetch_with_cache<T, E, F, Fut>(
    &self,
    key: &str,
    ttl: Duration,
    fetcher: F,
  ) -> Result<T, E>
  where
    T: Serialize + DeserializeOwned + Default,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<String, E>>,
  {
    if let Some(cached) = self.get(key).await {
      match serde_json::from_str::<T>(&cached) {
        Ok(data) => {
          debug!(key, "Cache hit");
          return Ok(data);
        }
        Err(e) => warn!(key, error = %e, "Discarding corrupt cache entry"),
      }
    }

    debug!(key, "Cache miss, fetching from upstream");
    let body = fetcher().await?;

    let data = match parse_body::<T>(&body) {
      Ok(data) => data,
      Err(e) => {
        warn!(key, error = %e, "Malformed upstream payload, substituting empty value");
        T::default()
      }
    };

    match serde_json::to_string(&data) {
      Ok(serialized) => self.set(key, &serialized, ttl).await,
      Err(e) => warn!(key, error = %e, "Failed to serialize value for cache"),
    }

    Ok(data)
  }
}

/// Parse an upstream body, tolerating a byte order mark and padding.
fn parse_body<T: DeserializeOwned>(body: &str) -> serde_json::Result<T> {
  serde_json::from_str(body.trim_start_matches('\u{feff}').trim())
}

impl<B: CacheBackend> Clone for CacheLayer<B> {
  fn clone(&self) -> Self {
    Self {
      backend: Arc::clone(&self.backend),
      connected: Arc::clone(&self.connected),
      disabled: Arc::clone(&self.disabled),
      timeout: self.timeout,
    }
  }
}
