//! Serde-deserializable types matching the transit facade's responses.
//!
//! These types are separate from the public types so the loosely shaped
//! upstream JSON can be absorbed without leaking Portuguese field names.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Accept a string, a number or null/missing for a string field.
fn loose_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
  D: Deserializer<'de>,
{
  Ok(match Value::deserialize(deserializer)? {
    Value::String(s) => s,
    Value::Number(n) => n.to_string(),
    Value::Bool(b) => b.to_string(),
    _ => String::new(),
  })
}

/// Accept an array of route entries, keeping only the ones that are objects.
/// Null or any other shape is an empty list.
fn loose_routes<'de, D>(deserializer: D) -> Result<Vec<ApiStopRoute>, D::Error>
where
  D: Deserializer<'de>,
{
  Ok(match Value::deserialize(deserializer)? {
    Value::Array(items) => items
      .into_iter()
      .filter(Value::is_object)
      .filter_map(|item| serde_json::from_value(item).ok())
      .collect(),
    _ => Vec::new(),
  })
}

// ============================================================================
// Stops listing (a=tp)
// ============================================================================

/// A route serving a stop.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ApiStopRoute {
  #[serde(rename = "idLinha", default, deserialize_with = "loose_string")]
  pub id_linha: String,
  #[serde(rename = "codigoLinha", default, deserialize_with = "loose_string")]
  pub codigo_linha: String,
  #[serde(rename = "nomeLinha", default, deserialize_with = "loose_string")]
  pub nome_linha: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ApiStop {
  #[serde(default, deserialize_with = "loose_string")]
  pub codigo: String,
  #[serde(default, deserialize_with = "loose_string")]
  pub latitude: String,
  #[serde(default, deserialize_with = "loose_string")]
  pub longitude: String,
  #[serde(default, deserialize_with = "loose_string")]
  pub terminal: String,
  #[serde(default, deserialize_with = "loose_routes")]
  pub linhas: Vec<ApiStopRoute>,
}

pub type ApiStopsResponse = Vec<ApiStop>;

// ============================================================================
// Routes listing (a=nc)
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ApiRoute {
  #[serde(default, deserialize_with = "loose_string")]
  pub id: String,
  #[serde(default, deserialize_with = "loose_string")]
  pub codigo: String,
  #[serde(default, deserialize_with = "loose_string")]
  pub nome: String,
}

pub type ApiRoutesResponse = Vec<ApiRoute>;

// ============================================================================
// Route details (a=il)
// ============================================================================

/// One coordinate pair as sent by the facade.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ApiCoordinates {
  #[serde(default, deserialize_with = "loose_string")]
  pub lat: String,
  #[serde(default, deserialize_with = "loose_string")]
  pub lng: String,
}

/// Route metadata mixed with coordinate pairs under keys "0", "1", ...
///
/// The numbered entries are kept raw in `extra`; their order is recovered
/// by the transformer from the numeric value of each key.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ApiRouteDetails {
  #[serde(default, deserialize_with = "loose_string")]
  pub idlinha: String,
  #[serde(default, deserialize_with = "loose_string")]
  pub nome: String,
  #[serde(default, deserialize_with = "loose_string")]
  pub codigo: String,
  #[serde(flatten)]
  pub extra: Map<String, Value>,
}

pub type ApiRouteDetailsResponse = ApiRouteDetails;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_stop_with_numeric_and_missing_fields() {
    let stops: ApiStopsResponse = serde_json::from_str(
      r#"[{"codigo": 4952, "latitude": "-30.0", "longitude": "-51.2", "terminal": null}]"#,
    )
    .unwrap();
    assert_eq!(stops[0].codigo, "4952");
    assert_eq!(stops[0].terminal, "");
    assert!(stops[0].linhas.is_empty());
  }

  #[test]
  fn test_stop_with_null_or_odd_routes_keeps_listing() {
    let stops: ApiStopsResponse = serde_json::from_str(
      r#"[
        {"codigo": "1", "linhas": [{"idLinha": "10", "nomeLinha": "ALPHA"}]},
        {"codigo": "2", "linhas": null},
        {"codigo": "3", "linhas": "none"},
        {"codigo": "4", "linhas": [7, null, {"idLinha": 11}]}
      ]"#,
    )
    .unwrap();
    assert_eq!(stops.len(), 4);
    assert_eq!(stops[0].linhas[0].nome_linha, "ALPHA");
    assert!(stops[1].linhas.is_empty());
    assert!(stops[2].linhas.is_empty());
    assert_eq!(stops[3].linhas.len(), 1);
    assert_eq!(stops[3].linhas[0].id_linha, "11");
  }

  #[test]
  fn test_route_details_keeps_numbered_entries() {
    let details: ApiRouteDetails = serde_json::from_str(
      r#"{"idlinha": "5566", "nome": "CAMPUS", "codigo": "A40", "0": {"lat": "1", "lng": "2"}}"#,
    )
    .unwrap();
    assert_eq!(details.idlinha, "5566");
    assert_eq!(details.extra.len(), 1);
    assert!(details.extra.contains_key("0"));
  }

  #[test]
  fn test_route_details_cache_round_trip() {
    let raw = r#"{"idlinha":"1","nome":"N","codigo":"C","2":{"lat":"5","lng":"6"},"10":{"lat":"7","lng":"8"}}"#;
    let details: ApiRouteDetails = serde_json::from_str(raw).unwrap();
    let reparsed: ApiRouteDetails =
      serde_json::from_str(&serde_json::to_string(&details).unwrap()).unwrap();
    assert_eq!(reparsed.extra, details.extra);
    assert_eq!(reparsed.nome, "N");
  }

  #[test]
  fn test_route_details_rejects_non_object() {
    assert!(serde_json::from_str::<ApiRouteDetails>("[]").is_err());
  }
}
