//! Types for the price resolver

use crate::{
    constants::{VNINDEX, VNINDEX_ALIASES},
    error::PriceError,
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Normalized ticker symbol (trimmed, upper-cased)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    /// Normalizes raw input, rejecting blank symbols
    pub fn parse(raw: &str) -> Result<Self, PriceError> {
        let normalized = raw.trim().to_uppercase();
        if normalized.is_empty() {
            return Err(PriceError::InvalidSymbol);
        }
        Ok(Self(normalized))
    }

    /// The symbol as the caller supplied it, normalized
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for `VNINDEX` and its `^VNINDEX` synonym
    pub fn is_index(&self) -> bool {
        VNINDEX_ALIASES.contains(&self.0.as_str())
    }

    /// The symbol sent upstream; index synonyms collapse to `VNINDEX`
    pub fn upstream(&self) -> &str {
        if self.is_index() {
            VNINDEX
        } else {
            &self.0
        }
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Family a candidate source belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Latest/simple realtime quote
    Latest,
    /// Most recent daily close record
    DailyClose,
}

/// One entry of the ordered candidate list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateSource {
    /// URL with a `{symbol}` placeholder
    pub template: String,
    pub kind: SourceKind,
}

impl CandidateSource {
    pub fn new(template: impl Into<String>, kind: SourceKind) -> Self {
        Self {
            template: template.into(),
            kind,
        }
    }

    /// Builds the request URL for a symbol
    pub fn url(&self, symbol: &str) -> String {
        self.template.replace("{symbol}", &urlencoding::encode(symbol))
    }
}

/// Daily-history fallback endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistorySource {
    /// URL with `{symbol}`, `{from}` and `{to}` placeholders (unix seconds)
    pub template: String,
    /// Length of the requested window
    pub window_days: i64,
}

impl HistorySource {
    pub fn new(template: impl Into<String>, window_days: i64) -> Self {
        Self {
            template: template.into(),
            window_days,
        }
    }

    /// Builds the request URL for a window ending at `now`
    pub fn url(&self, symbol: &str, now: DateTime<Utc>) -> String {
        let to = now.timestamp();
        let from = (now - Duration::days(self.window_days)).timestamp();
        self.template
            .replace("{symbol}", &urlencoding::encode(symbol))
            .replace("{from}", &from.to_string())
            .replace("{to}", &to.to_string())
    }
}

/// Diagnostic record of one source invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchAttempt {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    /// Leading characters of the body
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sample: Option<String>,
    pub parsed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FetchAttempt {
    /// Attempt that got a response back
    pub fn responded(url: &str, status: u16, sample: String, parsed: bool) -> Self {
        Self {
            url: url.to_string(),
            status: Some(status),
            sample: Some(sample),
            parsed,
            price: None,
            error: None,
        }
    }

    /// Attempt that never got a response
    pub fn failed(url: &str, error: impl Into<String>) -> Self {
        Self {
            url: url.to_string(),
            status: None,
            sample: None,
            parsed: false,
            price: None,
            error: Some(error.into()),
        }
    }
}

/// Leading `limit` characters of a body
pub fn body_sample(body: &str, limit: usize) -> String {
    body.chars().take(limit).collect()
}

/// Successful resolution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedPrice {
    /// Normalized symbol as requested
    pub symbol: String,
    pub price: f64,
    /// URL of the source that supplied the price
    pub source: String,
    /// Every attempt made, the winning one last
    pub attempts: Vec<FetchAttempt>,
}
