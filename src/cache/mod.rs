//! Best-effort caching of upstream responses.
//!
//! This module provides a transport-agnostic caching mechanism that:
//! - Stores serialized values under namespaced keys with a fixed TTL
//! - Supports Redis, SQLite and in-process backends behind one trait
//! - Never fails a request because of the cache: an unreachable store,
//!   a failing operation or a corrupt entry all degrade to a miss

mod backend;
mod layer;
mod redis_backend;
mod storage;
mod traits;

pub use backend::Backend;
pub use layer::CacheLayer;
pub use traits::CacheBackend;

#[cfg(test)]
pub mod testing;

#[cfg(test)]
pub use storage::MemoryBackend;
