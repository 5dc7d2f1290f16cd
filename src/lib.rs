//! # VN Price Proxy
//!
//! Resolves the latest trading price of a Vietnamese stock symbol (or the
//! VNINDEX composite) from a list of unofficial upstream endpoints and serves
//! it as one flat JSON response.
//!
//! ## Resolution
//!
//! ```text
//! symbol ─┬─ index? ───────────────────────────────┐
//!         └─ candidate 1 → candidate 2 → ... ─ miss ┴→ daily-history fallback
//!                 │ first finite price wins
//!                 ↓
//!          ResolvedPrice { price, source }
//! ```
//!
//! Upstream bodies are parsed loosely and a price is located heuristically
//! (see [`extract`]); a source that errors, returns non-JSON or has no
//! recognizable price is recorded as a [`FetchAttempt`] and skipped.
//!
//! ## Usage
//!
//! ```no_run
//! use vn_price_proxy::{PriceError, PriceResolver, ResolverConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let resolver = PriceResolver::new(ResolverConfig::default())?;
//!
//! match resolver.resolve("VNM").await {
//!     Ok(quote) => println!("{} = {} via {}", quote.symbol, quote.price, quote.source),
//!     Err(PriceError::NotFound { symbol, attempts }) => {
//!         eprintln!("no price for {} after {} attempts", symbol, attempts.len())
//!     }
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Adding Sources
//!
//! Sources are data: push a [`CandidateSource`] onto
//! [`ResolverConfig::sources`] in the desired priority position. Field
//! priority for extraction is likewise [`ResolverConfig::price_fields`].

pub mod config;
pub mod constants;
pub mod error;
pub mod extract;
pub mod logging;
pub mod provider;
pub mod providers;
pub mod resolver;
pub mod server;
pub mod types;

// Re-export commonly used types
pub use config::{ResolverConfig, ServerConfig};
pub use error::{ConfigError, PriceError, ProviderError};
pub use extract::PriceExtractor;
pub use provider::UpstreamClient;
pub use resolver::PriceResolver;
pub use types::{CandidateSource, FetchAttempt, HistorySource, ResolvedPrice, SourceKind, Symbol};
