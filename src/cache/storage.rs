//! Local cache storage: SQLite on disk and an in-process map.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

use super::traits::{CacheBackend, CacheError, CacheResult};

/// Schema for the key-value table.
const CACHE_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS cache_entries (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    expires_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_cache_entries_expires
    ON cache_entries(expires_at);
"#;

/// SQLite-based cache storage.
///
/// Expiry is stored as unix seconds. Expired rows are invisible to `get`
/// and purged whenever the store connects.
pub struct SqliteBackend {
  path: PathBuf,
  conn: Mutex<Option<Connection>>,
}

impl SqliteBackend {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self {
      path: path.into(),
      conn: Mutex::new(None),
    }
  }

  /// Get the default database path.
  pub fn default_path() -> Option<PathBuf> {
    dirs::data_dir()
      .or_else(|| dirs::home_dir().map(|p| p.join(".local/share")))
      .map(|dir| dir.join("poa-bus").join("cache.db"))
  }

  fn lock(&self) -> CacheResult<MutexGuard<'_, Option<Connection>>> {
    self
      .conn
      .lock()
      .map_err(|e| CacheError::Poisoned(e.to_string()))
  }

  /// Run a closure against the open connection.
  fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> rusqlite::Result<T>) -> CacheResult<T> {
    let guard = self.lock()?;
    let conn = guard.as_ref().ok_or(CacheError::NotConnected)?;
    Ok(f(conn)?)
  }
}

impl CacheBackend for SqliteBackend {
  fn name(&self) -> &'static str {
    "sqlite"
  }

  async fn connect(&self) -> CacheResult<()> {
    // Ensure parent directory exists
    if let Some(parent) = self.path.parent() {
      std::fs::create_dir_all(parent)?;
    }

    let conn = Connection::open(&self.path)?;
    conn.execute_batch(CACHE_SCHEMA)?;
    conn.execute(
      "DELETE FROM cache_entries WHERE expires_at <= ?",
      params![Utc::now().timestamp()],
    )?;

    *self.lock()? = Some(conn);
    Ok(())
  }

  async fn disconnect(&self) -> CacheResult<()> {
    if let Some(conn) = self.lock()?.take() {
      conn.close().map_err(|(_, e)| CacheError::Sqlite(e))?;
    }
    Ok(())
  }

  async fn get(&self, key: &str) -> CacheResult<Option<String>> {
    let now = Utc::now().timestamp();
    self.with_conn(|conn| {
      conn
        .query_row(
          "SELECT value FROM cache_entries WHERE key = ? AND expires_at > ?",
          params![key, now],
          |row| row.get(0),
        )
        .optional()
    })
  }

  async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
    let ttl_secs = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
    let expires_at = Utc::now().timestamp().saturating_add(ttl_secs);
    self.with_conn(|conn| {
      conn.execute(
        "INSERT OR REPLACE INTO cache_entries (key, value, expires_at) VALUES (?, ?, ?)",
        params![key, value, expires_at],
      )
    })?;
    Ok(())
  }

  async fn delete(&self, key: &str) -> CacheResult<()> {
    self.with_conn(|conn| conn.execute("DELETE FROM cache_entries WHERE key = ?", params![key]))?;
    Ok(())
  }

  async fn flush(&self) -> CacheResult<()> {
    self.with_conn(|conn| conn.execute("DELETE FROM cache_entries", []))?;
    Ok(())
  }
}

struct MemoryEntry {
  value: String,
  expires_at: Instant,
}

/// In-process store. Entries vanish with the process.
#[derive(Default)]
pub struct MemoryBackend {
  entries: Mutex<HashMap<String, MemoryEntry>>,
}

impl MemoryBackend {
  pub fn new() -> Self {
    Self::default()
  }

  fn lock(&self) -> CacheResult<MutexGuard<'_, HashMap<String, MemoryEntry>>> {
    self
      .entries
      .lock()
      .map_err(|e| CacheError::Poisoned(e.to_string()))
  }
}

impl CacheBackend for MemoryBackend {
  fn name(&self) -> &'static str {
    "memory"
  }

  async fn connect(&self) -> CacheResult<()> {
    Ok(())
  }

  async fn disconnect(&self) -> CacheResult<()> {
    Ok(())
  }

  async fn get(&self, key: &str) -> CacheResult<Option<String>> {
    let mut entries = self.lock()?;
    match entries.get(key) {
      Some(entry) if entry.expires_at > Instant::now() => Ok(Some(entry.value.clone())),
      Some(_) => {
        entries.remove(key);
        Ok(None)
      }
      None => Ok(None),
    }
  }

  async fn set(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
    let now = Instant::now();
    let expires_at = now.checked_add(ttl).unwrap_or(now + Duration::from_secs(u32::MAX as u64));
    self.lock()?.insert(
      key.to_string(),
      MemoryEntry {
        value: value.to_string(),
        expires_at,
      },
    );
    Ok(())
  }

  async fn delete(&self, key: &str) -> CacheResult<()> {
    self.lock()?.remove(key);
    Ok(())
  }

  async fn flush(&self) -> CacheResult<()> {
    self.lock()?.clear();
    Ok(())
  }
}
