//! Porto Alegre transit facade: upstream access, caching and public shapes.

pub mod api_types;
pub mod client;
pub mod convert;
pub mod endpoints;
pub mod service;
pub mod types;

#[cfg(test)]
pub mod testing;

pub use client::{TransitClient, Upstream};
pub use service::TransitService;
