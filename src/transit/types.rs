//! Public shapes returned by the transit tools.

use serde::Serialize;

/// A bus route, as listed on its own or as one of a stop's routes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Route {
  pub id: String,
  pub code: String,
  pub name: String,
}

/// A bus stop with the routes that serve it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Stop {
  pub code: String,
  pub latitude: String,
  pub longitude: String,
  pub terminal: String,
  pub routes: Vec<Route>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Coordinate {
  pub latitude: String,
  pub longitude: String,
}

/// A route with its path, coordinates in upstream order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteDetails {
  pub id: String,
  pub name: String,
  pub code: String,
  pub coordinates: Vec<Coordinate>,
}
