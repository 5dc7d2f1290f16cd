//! reqwest-backed upstream client

use crate::{
    config::ResolverConfig,
    error::ProviderError,
    provider::{UpstreamClient, UpstreamResponse},
};
use async_trait::async_trait;
use reqwest::{header, redirect, Client};
use std::time::Duration;

/// Upstream client performing real HTTP GETs
///
/// Every request carries the configured user agent and referer, an `Accept`
/// header tolerant of JSON or plain text, and `Cache-Control: no-cache`.
/// Redirects are followed.
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Creates a new client from resolver settings
    pub fn new(config: &ResolverConfig) -> Result<Self, ProviderError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_str(&config.accept)
                .map_err(|e| ProviderError::InvalidResponse(format!("bad accept header: {}", e)))?,
        );
        headers.insert(
            header::REFERER,
            header::HeaderValue::from_str(&config.referer)
                .map_err(|e| ProviderError::InvalidResponse(format!("bad referer header: {}", e)))?,
        );
        headers.insert(
            header::CACHE_CONTROL,
            header::HeaderValue::from_static("no-cache"),
        );
        headers.insert(header::PRAGMA, header::HeaderValue::from_static("no-cache"));

        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .redirect(redirect::Policy::limited(10))
            .build()
            .map_err(ProviderError::NetworkError)?;

        Ok(Self { client })
    }
}

#[async_trait]
impl UpstreamClient for HttpClient {
    async fn get(&self, url: &str) -> Result<UpstreamResponse, ProviderError> {
        tracing::debug!(url, "Fetching upstream");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(ProviderError::NetworkError)?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(ProviderError::NetworkError)?;

        tracing::debug!(url, status, bytes = body.len(), "Upstream responded");

        Ok(UpstreamResponse { status, body })
    }

    fn client_name(&self) -> &'static str {
        "reqwest"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builds_with_default_config() {
        assert!(HttpClient::new(&ResolverConfig::default()).is_ok());
    }

    #[test]
    fn test_rejects_unencodable_referer() {
        let config = ResolverConfig {
            referer: "bad\nvalue".to_string(),
            ..ResolverConfig::default()
        };
        assert!(HttpClient::new(&config).is_err());
    }
}
