//! Error types for the VN price proxy

use crate::types::FetchAttempt;
use thiserror::Error;

/// Errors that can occur when fetching a single upstream source
///
/// These never escape a resolution; the resolver records them on the
/// corresponding [`FetchAttempt`] and moves on to the next source.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Network request failed
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// Upstream answered with a non-success status
    #[error("HTTP status {0}")]
    HttpStatus(u16),

    /// Invalid response from provider
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Body parsed but no price could be located in it
    #[error("No price in response")]
    NoPrice,
}

/// Errors returned to callers of the resolver
#[derive(Debug, Error, Clone)]
pub enum PriceError {
    /// Symbol was empty after trimming
    #[error("Missing symbol")]
    InvalidSymbol,

    /// Every source, fallback included, was exhausted
    #[error("No price found for {symbol}")]
    NotFound {
        symbol: String,
        attempts: Vec<FetchAttempt>,
    },

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PriceError {
    /// Creates a NotFound error
    pub fn not_found(symbol: &str, attempts: Vec<FetchAttempt>) -> Self {
        Self::NotFound {
            symbol: symbol.to_string(),
            attempts,
        }
    }

    /// Creates an Internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Diagnostic attempts carried by the error, if any
    pub fn attempts(&self) -> &[FetchAttempt] {
        match self {
            Self::NotFound { attempts, .. } => attempts,
            _ => &[],
        }
    }
}

/// Errors raised while reading configuration from the environment
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Variable present but unparsable
    #[error("Invalid value for {var}: {value}")]
    InvalidValue { var: &'static str, value: String },
}
