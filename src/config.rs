use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::pagination::DEFAULT_PAGE_SIZE;

const DEFAULT_UPSTREAM_URL: &str = "http://www.poatransporte.com.br/php/facades/process.php";
const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";
const ONE_DAY_SECS: u64 = 24 * 60 * 60;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
  pub upstream: UpstreamConfig,
  pub cache: CacheConfig,
  pub pagination: PaginationConfig,
  pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
  /// Base URL of the transit facade; endpoints are selected by query string
  pub base_url: String,
  /// Per-request timeout; expiry counts as an upstream failure
  pub timeout_secs: u64,
}

impl Default for UpstreamConfig {
  fn default() -> Self {
    Self {
      base_url: DEFAULT_UPSTREAM_URL.to_string(),
      timeout_secs: 30,
    }
  }
}

impl UpstreamConfig {
  pub fn timeout(&self) -> Duration {
    Duration::from_secs(self.timeout_secs)
  }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackendKind {
  #[default]
  Redis,
  Sqlite,
  Memory,
  /// Run without any cache
  None,
}

impl std::str::FromStr for CacheBackendKind {
  type Err = color_eyre::Report;

  fn from_str(s: &str) -> Result<Self> {
    match s.trim().to_lowercase().as_str() {
      "redis" => Ok(Self::Redis),
      "sqlite" => Ok(Self::Sqlite),
      "memory" => Ok(Self::Memory),
      "none" | "off" => Ok(Self::None),
      other => Err(eyre!("Unknown cache backend: {}", other)),
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
  pub backend: CacheBackendKind,
  pub redis_url: String,
  /// SQLite database file (default: $XDG_DATA_HOME/poa-bus/cache.db)
  pub sqlite_path: Option<PathBuf>,
  /// Namespace prepended to every cache key
  pub key_prefix: String,
  pub ttl: TtlConfig,
  /// Deadline for a single cache read or write; a slower store counts as a miss
  pub operation_timeout_ms: u64,
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self {
      backend: CacheBackendKind::default(),
      redis_url: DEFAULT_REDIS_URL.to_string(),
      sqlite_path: None,
      key_prefix: "poa".to_string(),
      ttl: TtlConfig::default(),
      operation_timeout_ms: 2000,
    }
  }
}

impl CacheConfig {
  pub fn operation_timeout(&self) -> Duration {
    Duration::from_millis(self.operation_timeout_ms)
  }
}

/// Expiry per cached listing, in seconds.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct TtlConfig {
  pub stops: u64,
  pub routes: u64,
  pub route_details: u64,
}

impl Default for TtlConfig {
  fn default() -> Self {
    Self {
      stops: ONE_DAY_SECS,
      routes: ONE_DAY_SECS,
      route_details: ONE_DAY_SECS,
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PaginationConfig {
  pub page_size: NonZeroUsize,
}

impl Default for PaginationConfig {
  fn default() -> Self {
    Self {
      page_size: DEFAULT_PAGE_SIZE,
    }
  }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogConfig {
  /// Filter directive used when RUST_LOG is unset
  pub level: String,
  /// Write daily-rolling log files here instead of stderr
  pub dir: Option<PathBuf>,
}

impl Default for LogConfig {
  fn default() -> Self {
    Self {
      level: "info".to_string(),
      dir: None,
    }
  }
}

impl Config {
  /// Load configuration.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./poa-bus.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/poa-bus/config.yaml
  /// 4. Built-in defaults
  ///
  /// Environment overrides are applied last.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    let config = match path {
      Some(p) => Self::load_from_path(&p)?,
      None => Self::default(),
    };

    config.with_env_overrides(|name| std::env::var(name).ok())
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("poa-bus.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("poa-bus").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::parse(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  fn parse(contents: &str) -> std::result::Result<Self, serde_yaml::Error> {
    // An empty document deserializes to null rather than an empty map
    if contents.trim().is_empty() {
      return Ok(Self::default());
    }
    serde_yaml::from_str(contents)
  }

  /// Apply REDIS_URL, POA_BUS_UPSTREAM_URL and POA_BUS_CACHE_BACKEND.
  fn with_env_overrides(mut self, var: impl Fn(&str) -> Option<String>) -> Result<Self> {
    if let Some(url) = var("REDIS_URL").filter(|v| !v.is_empty()) {
      self.cache.redis_url = url;
    }
    if let Some(url) = var("POA_BUS_UPSTREAM_URL").filter(|v| !v.is_empty()) {
      self.upstream.base_url = url;
    }
    if let Some(backend) = var("POA_BUS_CACHE_BACKEND").filter(|v| !v.is_empty()) {
      self.cache.backend = backend.parse()?;
    }
    Ok(self)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashMap;

  fn no_env(_: &str) -> Option<String> {
    None
  }

  #[test]
  fn test_defaults() {
    let config = Config::default();
    assert_eq!(config.upstream.base_url, DEFAULT_UPSTREAM_URL);
    assert_eq!(config.cache.backend, CacheBackendKind::Redis);
    assert_eq!(config.cache.key_prefix, "poa");
    assert_eq!(config.cache.ttl.stops, 86_400);
    assert_eq!(config.cache.ttl.route_details, 86_400);
    assert_eq!(config.cache.operation_timeout(), Duration::from_secs(2));
    assert_eq!(config.pagination.page_size.get(), 100);
  }

  #[test]
  fn test_partial_yaml_keeps_defaults() {
    let config = Config::parse(
      "cache:\n  backend: sqlite\n  ttl:\n    routes: 60\npagination:\n  page_size: 25\n",
    )
    .unwrap();
    assert_eq!(config.cache.backend, CacheBackendKind::Sqlite);
    assert_eq!(config.cache.ttl.routes, 60);
    assert_eq!(config.cache.ttl.stops, 86_400);
    assert_eq!(config.pagination.page_size.get(), 25);
    assert_eq!(config.upstream.timeout_secs, 30);
  }

  #[test]
  fn test_empty_document_is_default() {
    let config = Config::parse("  \n").unwrap();
    assert_eq!(config.cache.redis_url, DEFAULT_REDIS_URL);
  }

  #[test]
  fn test_zero_page_size_rejected() {
    assert!(Config::parse("pagination:\n  page_size: 0\n").is_err());
  }

  #[test]
  fn test_env_overrides() {
    let env: HashMap<&str, &str> = [
      ("REDIS_URL", "redis://cache:6380"),
      ("POA_BUS_UPSTREAM_URL", "http://localhost:8080/process.php"),
      ("POA_BUS_CACHE_BACKEND", "Memory"),
    ]
    .into_iter()
    .collect();

    let config = Config::default()
      .with_env_overrides(|name| env.get(name).map(|v| v.to_string()))
      .unwrap();
    assert_eq!(config.cache.redis_url, "redis://cache:6380");
    assert_eq!(config.upstream.base_url, "http://localhost:8080/process.php");
    assert_eq!(config.cache.backend, CacheBackendKind::Memory);
  }

  #[test]
  fn test_unknown_backend_in_env_is_error() {
    let result = Config::default().with_env_overrides(|name| {
      (name == "POA_BUS_CACHE_BACKEND").then(|| "memcached".to_string())
    });
    assert!(result.is_err());
  }

  #[test]
  fn test_missing_explicit_path_is_error() {
    assert!(Config::load(Some(Path::new("/nonexistent/poa-bus.yaml"))).is_err());
    assert!(Config::default().with_env_overrides(no_env).is_ok());
  }
}
