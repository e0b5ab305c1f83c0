//! Test doubles for the transit facade.

use std::collections::HashMap;
use std::sync::Mutex;

use url::Url;

use crate::cache::{CacheBackend, CacheLayer, MemoryBackend};
use crate::config::CacheConfig;
use crate::error::{PoaError, Result};

use super::client::Upstream;
use super::service::TransitService;

pub const BASE: &str = "http://transit.test/process.php";

/// Upstream double that serves canned bodies by `a` action and records calls.
#[derive(Default)]
pub struct FakeUpstream {
  bodies: HashMap<String, String>,
  calls: Mutex<Vec<String>>,
}

impl FakeUpstream {
  pub fn with(mut self, action: &str, body: &str) -> Self {
    self.bodies.insert(action.to_string(), body.to_string());
    self
  }

  pub fn calls(&self) -> Vec<String> {
    self.calls.lock().unwrap().clone()
  }
}

impl Upstream for FakeUpstream {
  async fn get_text(&self, url: &Url) -> Result<String> {
    self.calls.lock().unwrap().push(url.to_string());
    let action = url
      .query_pairs()
      .find(|(k, _)| k == "a")
      .map(|(_, v)| v.into_owned())
      .unwrap_or_default();
    self
      .bodies
      .get(&action)
      .cloned()
      .ok_or_else(|| PoaError::upstream(url.as_str(), "status 503 Service Unavailable"))
  }
}

pub async fn service(upstream: FakeUpstream) -> TransitService<FakeUpstream, MemoryBackend> {
  service_with(upstream, MemoryBackend::new(), CacheConfig::default()).await
}

pub async fn service_with<B: CacheBackend>(
  upstream: FakeUpstream,
  backend: B,
  config: CacheConfig,
) -> TransitService<FakeUpstream, B> {
  let cache = CacheLayer::new(backend);
  cache.connect().await;
  TransitService::new(upstream, Url::parse(BASE).unwrap(), cache, config)
}
