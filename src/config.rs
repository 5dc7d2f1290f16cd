//! Resolver policy and server settings

use crate::{
    constants::{
        ACCEPT, DCHART_HISTORY_URL, DEFAULT_BIND_ADDR, HISTORY_WINDOW_DAYS, PRICE_FIELDS,
        REFERER, REQUEST_TIMEOUT_SECS, SAMPLE_CHARS, USER_AGENT, VDSC_QUOTE_URL,
        VNDIRECT_DAILY_URL, VNDIRECT_LATEST_URL,
    },
    error::ConfigError,
    types::{CandidateSource, HistorySource, SourceKind},
};
use std::net::SocketAddr;

/// Policy for a [`PriceResolver`](crate::resolver::PriceResolver)
///
/// Source order and field order are policy, not fixed behavior: the
/// defaults below reflect the most complete upstream ordering known, and
/// every knob can be overridden with the `with_*` methods.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Candidate sources, tried in order
    pub sources: Vec<CandidateSource>,
    /// Fallback consulted after every candidate fails
    pub history: HistorySource,
    /// Field names scanned for a price, highest priority first
    pub price_fields: Vec<String>,
    /// Characters of body kept per attempt
    pub sample_chars: usize,
    /// Skip extraction on non-2xx responses
    pub strict_status: bool,
    pub user_agent: String,
    pub accept: String,
    pub referer: String,
    pub request_timeout_secs: u64,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            sources: vec![
                CandidateSource::new(VDSC_QUOTE_URL, SourceKind::Latest),
                CandidateSource::new(VNDIRECT_LATEST_URL, SourceKind::Latest),
                CandidateSource::new(VNDIRECT_DAILY_URL, SourceKind::DailyClose),
            ],
            history: HistorySource::new(DCHART_HISTORY_URL, HISTORY_WINDOW_DAYS),
            price_fields: PRICE_FIELDS.iter().map(|f| f.to_string()).collect(),
            sample_chars: SAMPLE_CHARS,
            strict_status: true,
            user_agent: USER_AGENT.to_string(),
            accept: ACCEPT.to_string(),
            referer: REFERER.to_string(),
            request_timeout_secs: REQUEST_TIMEOUT_SECS,
        }
    }
}

impl ResolverConfig {
    pub fn with_sources(mut self, sources: Vec<CandidateSource>) -> Self {
        self.sources = sources;
        self
    }

    pub fn with_history(mut self, history: HistorySource) -> Self {
        self.history = history;
        self
    }

    pub fn with_price_fields<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.price_fields = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_strict_status(mut self, strict: bool) -> Self {
        self.strict_status = strict;
        self
    }

    pub fn with_request_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Plain,
    Json,
}

/// Settings for the HTTP binary, read from the environment
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub request_timeout_secs: u64,
    pub log_filter: String,
    pub log_format: LogFormat,
}

impl ServerConfig {
    /// Reads settings from process environment variables
    ///
    /// - `PRICE_PROXY_ADDR`: listen address (default `0.0.0.0:3000`)
    /// - `PORT`: overrides only the port, for platforms that inject it
    /// - `PRICE_PROXY_TIMEOUT_SECS`: upstream request timeout
    /// - `PRICE_PROXY_LOG` then `RUST_LOG`: tracing filter (default `info`)
    /// - `PRICE_PROXY_LOG_FORMAT`: `plain` or `json`
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an injectable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let addr_raw = var("PRICE_PROXY_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let mut bind_addr: SocketAddr =
            addr_raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue {
                    var: "PRICE_PROXY_ADDR",
                    value: addr_raw.clone(),
                })?;

        if let Some(port) = var("PORT") {
            let port: u16 = port.trim().parse().map_err(|_| ConfigError::InvalidValue {
                var: "PORT",
                value: port.clone(),
            })?;
            bind_addr.set_port(port);
        }

        let request_timeout_secs = match var("PRICE_PROXY_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::InvalidValue {
                    var: "PRICE_PROXY_TIMEOUT_SECS",
                    value: raw,
                })?,
            None => REQUEST_TIMEOUT_SECS,
        };

        let log_filter = var("PRICE_PROXY_LOG")
            .or_else(|| var("RUST_LOG"))
            .unwrap_or_else(|| "info".to_string());

        let log_format = match var("PRICE_PROXY_LOG_FORMAT").as_deref().map(str::trim) {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Plain,
        };

        Ok(Self {
            bind_addr,
            request_timeout_secs,
            log_filter,
            log_format,
        })
    }

    /// Resolver policy for this server
    pub fn resolver_config(&self) -> ResolverConfig {
        ResolverConfig::default().with_request_timeout_secs(self.request_timeout_secs)
    }
}
