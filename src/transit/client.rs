use std::future::Future;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::Client;
use url::Url;

use crate::config::UpstreamConfig;
use crate::error::{PoaError, Result};

/// Source of raw response bodies for facade URLs.
pub trait Upstream: Send + Sync {
  fn get_text(&self, url: &Url) -> impl Future<Output = Result<String>> + Send;
}

/// HTTP client for the transit facade.
#[derive(Clone)]
pub struct TransitClient {
  client: Client,
  base_url: Url,
}

impl TransitClient {
  pub fn new(config: &UpstreamConfig) -> Result<Self> {
    let base_url =
      Url::parse(&config.base_url).map_err(|e| PoaError::upstream(&config.base_url, e))?;

    let mut headers = HeaderMap::new();
    headers.insert(
      ACCEPT,
      HeaderValue::from_static("application/json, text/plain, */*"),
    );
    headers.insert(
      USER_AGENT,
      HeaderValue::from_static(concat!("poa-bus/", env!("CARGO_PKG_VERSION"))),
    );

    let client = Client::builder()
      .default_headers(headers)
      .timeout(config.timeout())
      .build()
      .map_err(|e| PoaError::upstream(&config.base_url, e))?;

    Ok(Self { client, base_url })
  }

  pub fn base_url(&self) -> &Url {
    &self.base_url
  }
}

impl Upstream for TransitClient {
  async fn get_text(&self, url: &Url) -> Result<String> {
    tracing::debug!(%url, "Requesting upstream");

    let response = self
      .client
      .get(url.clone())
      .send()
      .await
      .map_err(|e| PoaError::upstream(url.as_str(), e))?;

    let status = response.status();
    if !status.is_success() {
      return Err(PoaError::upstream(url.as_str(), format!("status {}", status)));
    }

    response
      .text()
      .await
      .map_err(|e| PoaError::upstream(url.as_str(), e))
  }
}
