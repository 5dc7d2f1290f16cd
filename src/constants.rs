//! Constants for the VN price proxy
//!
//! Defaults for the resolver and the HTTP boundary are centralized here.
//! `ResolverConfig::default()` and `ServerConfig::from_env()` read from these.

/// HTTP request timeout when fetching from an upstream (in seconds)
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// User agent for upstream requests
pub const USER_AGENT: &str = "Mozilla/5.0 (compatible; vn-price-proxy/0.1)";

/// Accept header tolerant of JSON and plain text bodies
pub const ACCEPT: &str = "application/json,text/plain,*/*";

/// Referer sent upstream; the dchart endpoints reject requests without one
pub const REFERER: &str = "https://dchart.vndirect.com.vn/";

/// Number of body characters kept on a fetch attempt for diagnostics
pub const SAMPLE_CHARS: usize = 200;

/// Days of daily closes requested from the history fallback
pub const HISTORY_WINDOW_DAYS: i64 = 45;

/// Canonical symbol for the VNINDEX composite
pub const VNINDEX: &str = "VNINDEX";

/// Symbols that denote the VNINDEX composite
pub const VNINDEX_ALIASES: &[&str] = &["VNINDEX", "^VNINDEX"];

/// Field names scanned for a price, highest priority first
pub const PRICE_FIELDS: &[&str] = &[
    "matchPrice",
    "close",
    "last",
    "price",
    "lastPrice",
    "currentPrice",
];

/// VDSC single-stock quote
pub const VDSC_QUOTE_URL: &str = "https://api.vdsc.com.vn/stock/{symbol}";

/// VNDirect latest price
pub const VNDIRECT_LATEST_URL: &str =
    "https://finfo-api.vndirect.com.vn/v4/stock_prices/latest?q=code:{symbol}";

/// VNDirect daily price records, most recent first
pub const VNDIRECT_DAILY_URL: &str =
    "https://finfo-api.vndirect.com.vn/v4/stock_prices?sort=date&q=code:{symbol}&size=1&page=1";

/// VNDirect dchart daily history (TradingView UDF format)
pub const DCHART_HISTORY_URL: &str = "https://dchart-api.vndirect.com.vn/dchart/history?symbol={symbol}&resolution=1D&from={from}&to={to}";

/// Cache directive for successful price responses
pub const CACHE_CONTROL_SUCCESS: &str = "public, s-maxage=30, stale-while-revalidate=60";

/// Default listen address for the HTTP server
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
