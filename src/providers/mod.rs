//! Upstream client implementations and source-specific parsers

pub mod history;
pub mod http;

pub use http::HttpClient;
