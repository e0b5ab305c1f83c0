//! Facade endpoints and the cache keys they are stored under.

use std::time::Duration;

use url::Url;

use crate::config::CacheConfig;

/// One read-only call against the transit facade.
///
/// The facade is a single script; the `a` query parameter picks the action
/// and `p` carries its argument.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Endpoint {
  /// Every stop with the routes serving it
  Stops,
  /// Every bus route
  Routes,
  /// One route's metadata and path
  RouteDetails { route_id: String },
}

impl Endpoint {
  fn query(&self) -> Vec<(&'static str, &str)> {
    match self {
      Self::Stops => vec![("a", "tp"), ("p", "")],
      Self::Routes => vec![("a", "nc"), ("p", "%"), ("t", "o")],
      Self::RouteDetails { route_id } => vec![("a", "il"), ("p", route_id.as_str())],
    }
  }

  /// Full request URL, with arguments percent-encoded.
  pub fn url(&self, base: &Url) -> Url {
    let mut url = base.clone();
    url.query_pairs_mut().clear().extend_pairs(self.query());
    url
  }

  /// Namespaced cache key, e.g. `poa:route:5566`.
  pub fn cache_key(&self, prefix: &str) -> String {
    match self {
      Self::Stops => format!("{}:stops", prefix),
      Self::Routes => format!("{}:routes", prefix),
      Self::RouteDetails { route_id } => format!("{}:route:{}", prefix, route_id),
    }
  }

  pub fn ttl(&self, config: &CacheConfig) -> Duration {
    let secs = match self {
      Self::Stops => config.ttl.stops,
      Self::Routes => config.ttl.routes,
      Self::RouteDetails { .. } => config.ttl.route_details,
    };
    Duration::from_secs(secs)
  }

  pub fn description(&self) -> String {
    match self {
      Self::Stops => "all stops".to_string(),
      Self::Routes => "all routes".to_string(),
      Self::RouteDetails { route_id } => format!("route {}", route_id),
    }
  }
}
