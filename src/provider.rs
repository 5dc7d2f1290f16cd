//! Upstream client abstraction for fetching raw quote bodies

use crate::error::ProviderError;
use async_trait::async_trait;

/// Raw upstream response, body read as text regardless of content type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamResponse {
    pub status: u16,
    pub body: String,
}

impl UpstreamResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// True for 2xx statuses
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Trait for clients that perform upstream GETs
///
/// The resolver only ever needs "GET this URL and give me the body", so the
/// production implementation (reqwest) and the test mock meet here.
#[async_trait]
pub trait UpstreamClient: Send + Sync {
    /// Fetches `url` and returns its status and text body
    ///
    /// # Arguments
    /// * `url` - Fully substituted upstream URL
    ///
    /// # Returns
    /// The status and body of whatever the upstream answered. Non-success
    /// statuses are returned as responses, not errors; only transport
    /// failures produce `Err`.
    async fn get(&self, url: &str) -> Result<UpstreamResponse, ProviderError>;

    /// Returns the name of this client
    fn client_name(&self) -> &'static str;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Mock client for testing
    ///
    /// Responses are registered against a URL prefix; the first matching
    /// prefix wins. Unmatched URLs fail with a network-style error.
    pub struct MockClient {
        routes: Arc<Mutex<Vec<(String, Result<UpstreamResponse, String>)>>>,
        calls: Arc<Mutex<Vec<String>>>,
    }

    impl Default for MockClient {
        fn default() -> Self {
            Self::new()
        }
    }

    impl MockClient {
        pub fn new() -> Self {
            Self {
                routes: Arc::new(Mutex::new(Vec::new())),
                calls: Arc::new(Mutex::new(Vec::new())),
            }
        }

        pub fn respond(&self, prefix: &str, status: u16, body: &str) {
            self.routes
                .lock()
                .unwrap()
                .push((prefix.to_string(), Ok(UpstreamResponse::new(status, body))));
        }

        pub fn fail(&self, prefix: &str, message: &str) {
            self.routes
                .lock()
                .unwrap()
                .push((prefix.to_string(), Err(message.to_string())));
        }

        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl UpstreamClient for MockClient {
        async fn get(&self, url: &str) -> Result<UpstreamResponse, ProviderError> {
            self.calls.lock().unwrap().push(url.to_string());
            let routes = self.routes.lock().unwrap();
            match routes.iter().find(|(prefix, _)| url.starts_with(prefix.as_str())) {
                Some((_, Ok(response))) => Ok(response.clone()),
                Some((_, Err(message))) => Err(ProviderError::InvalidResponse(message.clone())),
                None => Err(ProviderError::InvalidResponse(format!(
                    "connection refused: {}",
                    url
                ))),
            }
        }

        fn client_name(&self) -> &'static str {
            "mock"
        }
    }
}
