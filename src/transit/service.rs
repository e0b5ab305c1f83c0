//! Transit service that wraps an upstream with transparent caching.

use serde::{de::DeserializeOwned, Serialize};
use url::Url;

use crate::cache::{CacheBackend, CacheLayer};
use crate::config::CacheConfig;
use crate::error::Result;

use super::api_types::{ApiRouteDetailsResponse, ApiRoutesResponse, ApiStopsResponse};
use super::client::Upstream;
use super::endpoints::Endpoint;

/// Facade access with cache-aside reads.
///
/// Listings come back exactly as the facade orders them, so cursors over
/// them stay valid for as long as the cached copy lives.
pub struct TransitService<U: Upstream, B: CacheBackend> {
  upstream: U,
  base_url: Url,
  cache: CacheLayer<B>,
  cache_config: CacheConfig,
}

impl<U: Upstream, B: CacheBackend> TransitService<U, B> {
  pub fn new(upstream: U, base_url: Url, cache: CacheLayer<B>, cache_config: CacheConfig) -> Self {
    Self {
      upstream,
      base_url,
      cache,
      cache_config,
    }
  }

  #[cfg(test)]
  pub fn cache(&self) -> &CacheLayer<B> {
    &self.cache
  }

  #[cfg(test)]
  pub fn upstream(&self) -> &U {
    &self.upstream
  }

  async fn fetch<T>(&self, endpoint: Endpoint) -> Result<T>
  where
    T: Serialize + DeserializeOwned + Default,
  {
    let url = endpoint.url(&self.base_url);
    let key = endpoint.cache_key(&self.cache_config.key_prefix);
    let ttl = endpoint.ttl(&self.cache_config);
    tracing::debug!(endpoint = %endpoint.description(), key = %key, "Fetching");

    let upstream = &self.upstream;
    let url = &url;
    self
      .cache
      .fetch_with_cache(&key, ttl, move || upstream.get_text(url))
      .await
  }

  pub async fn get_stops(&self) -> Result<ApiStopsResponse> {
    self.fetch(Endpoint::Stops).await
  }

  pub async fn get_routes(&self) -> Result<ApiRoutesResponse> {
    self.fetch(Endpoint::Routes).await
  }

  pub async fn get_route_details(&self, route_id: &str) -> Result<ApiRouteDetailsResponse> {
    self
      .fetch(Endpoint::RouteDetails {
        route_id: route_id.to_string(),
      })
      .await
  }
}
