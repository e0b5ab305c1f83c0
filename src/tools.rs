//! Tool handlers shared by the MCP server and the one-shot CLI commands.

use std::num::NonZeroUsize;

use crate::cache::CacheBackend;
use crate::error::{PoaError, Result};
use crate::pagination::{self, Page};
use crate::transit::convert::{transform_route_details, transform_routes, transform_stops};
use crate::transit::types::{Route, RouteDetails, Stop};
use crate::transit::{TransitService, Upstream};

/// Fetch, reshape and page transit data for one tool call.
pub struct TransitTools<U: Upstream, B: CacheBackend> {
  service: TransitService<U, B>,
  page_size: NonZeroUsize,
}

impl<U: Upstream, B: CacheBackend> TransitTools<U, B> {
  pub fn new(service: TransitService<U, B>, page_size: NonZeroUsize) -> Self {
    Self { service, page_size }
  }

  #[cfg(test)]
  pub fn service(&self) -> &TransitService<U, B> {
    &self.service
  }

  /// One page of bus stops.
  pub async fn stops(&self, cursor: Option<&str>) -> Result<Page<Stop>> {
    // Reject a bad cursor before spending an upstream call on it
    pagination::cursor::decode(cursor)?;
    let stops = transform_stops(self.service.get_stops().await?);
    Ok(pagination::paginate(&stops, cursor, self.page_size)?)
  }

  /// One page of bus routes.
  pub async fn routes(&self, cursor: Option<&str>) -> Result<Page<Route>> {
    pagination::cursor::decode(cursor)?;
    let routes = transform_routes(self.service.get_routes().await?);
    Ok(pagination::paginate(&routes, cursor, self.page_size)?)
  }

  /// A single route with its ordered path.
  pub async fn route_details(&self, route_id: &str) -> Result<RouteDetails> {
    let route_id = route_id.trim();
    if route_id.is_empty() {
      return Err(PoaError::InvalidRouteId);
    }
    let details = self.service.get_route_details(route_id).await?;
    Ok(transform_route_details(details))
  }
}
