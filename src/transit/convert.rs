//! Conversion from upstream responses to public types.
//!
//! All conversions are total: missing fields were already defaulted to
//! empty strings during deserialization.

use serde_json::Value;

use super::api_types::{
  ApiCoordinates, ApiRoute, ApiRouteDetails, ApiRoutesResponse, ApiStop, ApiStopRoute,
  ApiStopsResponse,
};
use super::types::{Coordinate, Route, RouteDetails, Stop};

impl From<ApiStopRoute> for Route {
  fn from(linha: ApiStopRoute) -> Self {
    Self {
      id: linha.id_linha,
      code: linha.codigo_linha,
      name: linha.nome_linha,
    }
  }
}

impl From<ApiRoute> for Route {
  fn from(route: ApiRoute) -> Self {
    Self {
      id: route.id,
      code: route.codigo,
      name: route.nome,
    }
  }
}

impl From<ApiStop> for Stop {
  fn from(stop: ApiStop) -> Self {
    Self {
      code: stop.codigo,
      latitude: stop.latitude,
      longitude: stop.longitude,
      terminal: stop.terminal,
      routes: stop.linhas.into_iter().map(Route::from).collect(),
    }
  }
}

impl From<ApiCoordinates> for Coordinate {
  fn from(coordinates: ApiCoordinates) -> Self {
    Self {
      latitude: coordinates.lat,
      longitude: coordinates.lng,
    }
  }
}

pub fn transform_stops(stops: ApiStopsResponse) -> Vec<Stop> {
  stops.into_iter().map(Stop::from).collect()
}

pub fn transform_routes(routes: ApiRoutesResponse) -> Vec<Route> {
  routes.into_iter().map(Route::from).collect()
}

/// Collect the numbered coordinate entries, ordered by their numeric key.
///
/// The map's own key order is lexicographic ("10" before "2") and must not
/// be relied on.
pub fn transform_route_details(details: ApiRouteDetails) -> RouteDetails {
  let mut numbered: Vec<(u64, Value)> = details
    .extra
    .into_iter()
    .filter_map(|(key, value)| key.trim().parse::<u64>().ok().map(|index| (index, value)))
    .collect();
  numbered.sort_by_key(|(index, _)| *index);

  let coordinates: Vec<Coordinate> = numbered
    .into_iter()
    .map(|(_, value)| {
      let raw = serde_json::from_value::<ApiCoordinates>(value).unwrap_or_default();
      Coordinate::from(raw)
    })
    .collect();

  RouteDetails {
    id: details.idlinha,
    name: details.nome,
    code: details.codigo,
    coordinates,
  }
}
