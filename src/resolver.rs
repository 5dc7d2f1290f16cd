//! Multi-source price resolution
//!
//! Candidate sources are tried strictly in order and the first one that
//! yields a finite price wins; later sources are never consulted. When every
//! candidate misses, the daily-history fallback supplies the latest close.
//! Index symbols go straight to the fallback.

use crate::{
    config::ResolverConfig,
    error::{PriceError, ProviderError},
    extract::PriceExtractor,
    provider::UpstreamClient,
    providers::{history, HttpClient},
    types::{body_sample, FetchAttempt, ResolvedPrice, Symbol},
};
use chrono::Utc;
use serde_json::Value;
use std::sync::Arc;
use tracing::instrument;

/// Resolves the latest price of a symbol across fallback upstreams
///
/// Holds no mutable state; one resolver can serve any number of
/// concurrent resolutions.
///
/// # Example
/// ```no_run
/// use vn_price_proxy::{PriceResolver, ResolverConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let resolver = PriceResolver::new(ResolverConfig::default())?;
/// let quote = resolver.resolve("fpt").await?;
/// println!("{}: {} (from {})", quote.symbol, quote.price, quote.source);
/// # Ok(())
/// # }
/// ```
pub struct PriceResolver {
    client: Arc<dyn UpstreamClient>,
    config: ResolverConfig,
    extractor: PriceExtractor,
}

impl PriceResolver {
    /// Creates a resolver backed by a real HTTP client
    pub fn new(config: ResolverConfig) -> Result<Self, ProviderError> {
        let client = Arc::new(HttpClient::new(&config)?);
        Ok(Self::with_client(client, config))
    }

    /// Creates a resolver with a custom upstream client
    ///
    /// This is primarily for testing with mock clients.
    pub fn with_client(client: Arc<dyn UpstreamClient>, config: ResolverConfig) -> Self {
        let extractor = PriceExtractor::new(config.price_fields.clone());
        Self {
            client,
            config,
            extractor,
        }
    }

    /// Resolves the latest price for `symbol`
    ///
    /// # Arguments
    /// * `symbol` - Raw ticker; trimmed and upper-cased before use. `VNINDEX`
    ///   and `^VNINDEX` go straight to the daily-history fallback.
    ///
    /// # Returns
    /// The first finite price found, with the URL that supplied it and every
    /// attempt made. `PriceError::InvalidSymbol` for a blank symbol;
    /// `PriceError::NotFound` when every source misses, carrying one attempt
    /// per source tried, in order, fallback included.
    #[instrument(skip(self), fields(client = self.client.client_name()))]
    pub async fn resolve(&self, symbol: &str) -> Result<ResolvedPrice, PriceError> {
        let symbol = Symbol::parse(symbol)?;
        let upstream = symbol.upstream();
        let mut attempts = Vec::new();

        if !symbol.is_index() {
            for source in &self.config.sources {
                let url = source.url(upstream);
                let attempt = self
                    .fetch(&url, |body| self.extractor.extract(body, upstream))
                    .await;

                tracing::debug!(
                    url = %attempt.url,
                    kind = ?source.kind,
                    status = ?attempt.status,
                    price = ?attempt.price,
                    "Candidate source tried"
                );

                attempts.push(attempt);
                if let Some(resolved) = settle(&symbol, &attempts) {
                    return Ok(resolved);
                }
            }
        }

        let url = self.config.history.url(upstream, Utc::now());
        let attempt = self.fetch(&url, history::latest_close).await;
        attempts.push(attempt);

        if let Some(resolved) = settle(&symbol, &attempts) {
            tracing::debug!(source = %resolved.source, "Resolved from daily history");
            return Ok(resolved);
        }

        tracing::warn!(attempts = attempts.len(), "No price found");
        Err(PriceError::not_found(symbol.as_str(), attempts))
    }

    /// Fetches only the first candidate source
    ///
    /// Backs the legacy single-upstream quote endpoint; no fallback is tried.
    #[instrument(skip(self))]
    pub async fn quote_single(&self, symbol: &str) -> Result<ResolvedPrice, PriceError> {
        let symbol = Symbol::parse(symbol)?;
        let upstream = symbol.upstream();
        let source = self
            .config
            .sources
            .first()
            .ok_or_else(|| PriceError::internal("No candidate sources configured"))?;

        let url = source.url(upstream);
        let attempt = self
            .fetch(&url, |body| self.extractor.extract(body, upstream))
            .await;
        let attempts = vec![attempt];

        settle(&symbol, &attempts).ok_or_else(|| PriceError::not_found(symbol.as_str(), attempts))
    }

    /// Fetches one URL and records the outcome
    ///
    /// Never fails: transport errors, bad statuses, non-JSON bodies and
    /// extraction misses all end up on the returned attempt.
    async fn fetch<F>(&self, url: &str, extract: F) -> FetchAttempt
    where
        F: Fn(&Value) -> Option<f64> + Send,
    {
        let response = match self.client.get(url).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(url, error = %e, "Upstream request failed");
                return FetchAttempt::failed(url, e.to_string());
            }
        };

        let parsed = serde_json::from_str::<Value>(&response.body).ok();
        let mut attempt = FetchAttempt::responded(
            url,
            response.status,
            body_sample(&response.body, self.config.sample_chars),
            parsed.is_some(),
        );

        if self.config.strict_status && !response.is_success() {
            tracing::warn!(url, status = response.status, "Upstream returned error status");
            attempt.error = Some(ProviderError::HttpStatus(response.status).to_string());
            return attempt;
        }

        let Some(body) = parsed else {
            attempt.error =
                Some(ProviderError::InvalidResponse("body is not JSON".to_string()).to_string());
            return attempt;
        };

        match extract(&body) {
            Some(price) => attempt.price = Some(price),
            None => attempt.error = Some(ProviderError::NoPrice.to_string()),
        }

        attempt
    }
}

/// Success if the latest attempt produced a price
fn settle(symbol: &Symbol, attempts: &[FetchAttempt]) -> Option<ResolvedPrice> {
    let last = attempts.last()?;
    let price = last.price?;
    Some(ResolvedPrice {
        symbol: symbol.as_str().to_string(),
        price,
        source: last.url.clone(),
        attempts: attempts.to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        provider::mock::MockClient,
        types::{CandidateSource, HistorySource, SourceKind},
    };

    const HISTORY_PREFIX: &str = "https://h.test/history?symbol=";

    fn test_config() -> ResolverConfig {
        ResolverConfig::default()
            .with_sources(vec![
                CandidateSource::new("https://a.test/{symbol}", SourceKind::Latest),
                CandidateSource::new("https://b.test/{symbol}", SourceKind::Latest),
                CandidateSource::new("https://c.test/{symbol}", SourceKind::DailyClose),
            ])
            .with_history(HistorySource::new(
                "https://h.test/history?symbol={symbol}&from={from}&to={to}",
                45,
            ))
    }

    fn resolver(client: &Arc<MockClient>) -> PriceResolver {
        PriceResolver::with_client(client.clone(), test_config())
    }

    #[tokio::test]
    async fn test_first_source_wins() {
        let client = Arc::new(MockClient::new());
        client.respond("https://a.test/FPT", 200, r#"{"data":[{"close":28.5,"matchPrice":28.7}]}"#);
        client.respond("https://b.test/FPT", 200, r#"{"price": 99}"#);

        let resolved = resolver(&client).resolve(" fpt ").await.unwrap();

        assert_eq!(resolved.symbol, "FPT");
        assert_eq!(resolved.price, 28.7);
        assert_eq!(resolved.source, "https://a.test/FPT");
        assert_eq!(client.calls(), vec!["https://a.test/FPT".to_string()]);
    }

    #[tokio::test]
    async fn test_falls_back_to_daily_history() {
        let client = Arc::new(MockClient::new());
        client.respond("https://a.test/VCB", 200, "<html>maintenance</html>");
        client.fail("https://b.test/VCB", "connection reset");
        client.respond("https://c.test/VCB", 200, r#"{"data":[]}"#);
        client.respond(HISTORY_PREFIX, 200, r#"{"s":"ok","c":[90.1,91.0,92.3]}"#);

        let resolved = resolver(&client).resolve("VCB").await.unwrap();

        assert_eq!(resolved.price, 92.3);
        assert!(resolved.source.starts_with("https://h.test/history?symbol=VCB&from="));
        assert_eq!(client.call_count(), 4);

        let attempts = &resolved.attempts;
        assert_eq!(attempts.len(), 4);
        assert!(!attempts[0].parsed);
        assert_eq!(attempts[0].sample.as_deref(), Some("<html>maintenance</html>"));
        assert_eq!(attempts[1].status, None);
        assert!(attempts[1].error.is_some());
        assert!(attempts[2].parsed);
        assert_eq!(attempts[2].price, None);
        assert_eq!(attempts[3].price, Some(92.3));
    }

    #[tokio::test]
    async fn test_empty_daily_page_does_not_win_over_history() {
        let client = Arc::new(MockClient::new());
        client.respond("https://a.test/ACB", 404, r#"{"error":"not found"}"#);
        client.respond("https://b.test/ACB", 200, "null");
        client.respond(
            "https://c.test/ACB",
            200,
            r#"{"data":[],"currentPage":1,"size":1,"totalElements":0,"totalPages":0}"#,
        );
        client.respond(HISTORY_PREFIX, 200, r#"{"s":"ok","c":[24.1,24.35]}"#);

        let resolved = resolver(&client).resolve("ACB").await.unwrap();

        assert_eq!(resolved.price, 24.35);
        assert!(resolved.source.starts_with(HISTORY_PREFIX));
        assert_eq!(resolved.attempts.len(), 4);
        assert!(resolved.attempts[2].parsed);
        assert_eq!(resolved.attempts[2].price, None);
    }

    #[tokio::test]
    async fn test_index_uses_history_only() {
        for raw in ["VNINDEX", "^vnindex"] {
            let client = Arc::new(MockClient::new());
            client.respond("https://a.test/", 200, r#"{"price": 1}"#);
            client.respond(HISTORY_PREFIX, 200, r#"{"s":"ok","c":[1270.55]}"#);

            let resolved = resolver(&client).resolve(raw).await.unwrap();

            assert_eq!(resolved.price, 1270.55);
            let calls = client.calls();
            assert_eq!(calls.len(), 1);
            assert!(calls[0].starts_with("https://h.test/history?symbol=VNINDEX&"));
        }
    }

    #[tokio::test]
    async fn test_index_failure_has_single_attempt() {
        let client = Arc::new(MockClient::new());
        client.respond(HISTORY_PREFIX, 200, r#"{"s":"no_data"}"#);

        let err = resolver(&client).resolve("^VNINDEX").await.unwrap_err();

        assert_eq!(err.to_string(), "No price found for ^VNINDEX");
        assert_eq!(err.attempts().len(), 1);
    }

    #[tokio::test]
    async fn test_exhaustion_reports_every_attempt_in_order() {
        let client = Arc::new(MockClient::new());
        client.respond("https://a.test/HPG", 200, "not json at all");

        let err = resolver(&client).resolve("hpg").await.unwrap_err();

        match &err {
            PriceError::NotFound { symbol, attempts } => {
                assert_eq!(symbol, "HPG");
                let urls: Vec<&str> = attempts.iter().map(|a| a.url.as_str()).collect();
                assert_eq!(urls[..3], ["https://a.test/HPG", "https://b.test/HPG", "https://c.test/HPG"]);
                assert!(urls[3].starts_with(HISTORY_PREFIX));
                assert!(attempts.iter().all(|a| a.price.is_none() && a.error.is_some()));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_error_status_is_skipped_when_strict() {
        let client = Arc::new(MockClient::new());
        client.respond("https://a.test/MWG", 404, r#"{"status": 404}"#);
        client.respond("https://b.test/MWG", 200, r#"[{"lastPrice": "45.6"}]"#);

        let resolved = resolver(&client).resolve("MWG").await.unwrap();
        assert_eq!(resolved.price, 45.6);
        assert_eq!(resolved.attempts[0].status, Some(404));
        assert_eq!(resolved.attempts[0].error.as_deref(), Some("HTTP status 404"));

        let lenient = PriceResolver::with_client(client.clone(), test_config().with_strict_status(false));
        let resolved = lenient.resolve("MWG").await.unwrap();
        assert_eq!(resolved.price, 404.0);
        assert_eq!(resolved.source, "https://a.test/MWG");
    }

    #[tokio::test]
    async fn test_field_order_is_configurable() {
        let client = Arc::new(MockClient::new());
        client.respond("https://a.test/FPT", 200, r#"{"data":[{"close":28.5,"matchPrice":28.7}]}"#);

        let config = test_config().with_price_fields(["close", "matchPrice"]);
        let resolved = PriceResolver::with_client(client.clone(), config)
            .resolve("FPT")
            .await
            .unwrap();

        assert_eq!(resolved.price, 28.5);
    }

    #[tokio::test]
    async fn test_blank_symbol_is_rejected_without_requests() {
        let client = Arc::new(MockClient::new());
        let err = resolver(&client).resolve("  ").await.unwrap_err();

        assert!(matches!(err, PriceError::InvalidSymbol));
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn test_quote_single_uses_first_source_only() {
        let client = Arc::new(MockClient::new());
        client.respond("https://a.test/SSI", 200, r#"{"matchPrice": 31.25}"#);
        client.respond(HISTORY_PREFIX, 200, r#"{"s":"ok","c":[30.0]}"#);

        let resolved = resolver(&client).quote_single("ssi").await.unwrap();
        assert_eq!(resolved.price, 31.25);

        let err = resolver(&client).quote_single("VNM").await.unwrap_err();
        assert_eq!(err.attempts().len(), 1);
        assert!(client.calls().iter().all(|url| !url.starts_with(HISTORY_PREFIX)));
    }
}
