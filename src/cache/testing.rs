//! Test doubles for cache backends.

use std::sync::Mutex;
use std::time::Duration;

use super::storage::MemoryBackend;
use super::traits::{CacheBackend, CacheResult};

/// In-memory backend that also records every `set` it receives.
#[derive(Default)]
pub struct RecordingBackend {
  inner: MemoryBackend,
  sets: Mutex<Vec<(String, String, Duration)>>,
}

impl RecordingBackend {
  pub fn new() -> Self {
    Self::default()
  }

  /// `(key, value, ttl)` for each write, oldest first.
  pub fn sets(&self) -> Vec<(String, String, Duration)> {
    self.sets.lock().unwrap().clone()
  }
}

impl CacheBackend for RecordingBackend {
  fn name(&self) -> &'static str {
    "recording"
  }

  async fn connect(&self) -> CacheResult<()> {
    self.inner.connect().await
  }

  async fn disconnect(&self) -> CacheResult<()> {
    self.inner.disconnect().await
  }

  async fn get(&self, key: &str) -> CacheResult<Option<String>> {
    self.inner.get(key).await
  }

  async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
    self
      .sets
      .lock()
      .unwrap()
      .push((key.to_string(), value.to_string(), ttl));
    self.inner.set(key, value, ttl).await
  }

  async fn delete(&self, key: &str) -> CacheResult<()> {
    self.inner.delete(key).await
  }

  async fn flush(&self) -> CacheResult<()> {
    self.inner.flush().await
  }
}

/// Backend whose reads and writes never complete.
pub struct StalledBackend;

impl CacheBackend for StalledBackend {
  fn name(&self) -> &'static str {
    "stalled"
  }

  async fn connect(&self) -> CacheResult<()> {
    Ok(())
  }

  async fn disconnect(&self) -> CacheResult<()> {
    Ok(())
  }

  async fn get(&self, _key: &str) -> CacheResult<Option<String>> {
    std::future::pending().await
  }

  async fn set(&self, _key: &str, _value: &str, _ttl: Duration) -> CacheResult<()> {
    std::future::pending().await
  }

  async fn delete(&self, _key: &str) -> CacheResult<()> {
    std::future::pending().await
  }

  async fn flush(&self) -> CacheResult<()> {
    std::future::pending().await
  }
}
