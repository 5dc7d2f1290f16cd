//! HTTP boundary: query parsing, CORS, caching and status mapping

use crate::{
    constants::CACHE_CONTROL_SUCCESS,
    error::PriceError,
    resolver::PriceResolver,
    types::FetchAttempt,
};
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

#[derive(Debug, Deserialize)]
struct PriceQuery {
    symbol: Option<String>,
    debug: Option<String>,
}

impl PriceQuery {
    /// Non-blank symbol, if any
    fn symbol(&self) -> Option<&str> {
        self.symbol
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// `debug` present and not `""`, `0` or `false`
    fn debug(&self) -> bool {
        match self.debug.as_deref().map(str::trim) {
            None | Some("") | Some("0") => false,
            Some(flag) => !flag.eq_ignore_ascii_case("false"),
        }
    }
}

#[derive(Serialize)]
struct PriceBody<'a> {
    symbol: &'a str,
    price: f64,
    source: &'a str,
    ts: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    attempts: Option<&'a [FetchAttempt]>,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    attempts: Option<&'a [FetchAttempt]>,
}

/// Builds the proxy router
///
/// - `GET /api/price?symbol=&debug=` (also `/`): resolved price
/// - `GET /api/stock-price?symbol=`: single-upstream quote
/// - `GET /health`
///
/// `OPTIONS` on any route is answered by the CORS layer.
pub fn router(resolver: Arc<PriceResolver>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/", get(price_handler))
        .route("/api/price", get(price_handler))
        .route("/api/stock-price", get(stock_price_handler))
        .route("/health", get(health))
        .layer(cors)
        .with_state(resolver)
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

fn missing_symbol() -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "error": "Missing symbol" })),
    )
        .into_response()
}

/// Malformed query strings (e.g. a repeated `symbol`) are a JSON 400
fn parse_query(query: Result<Query<PriceQuery>, QueryRejection>) -> Result<PriceQuery, Response> {
    query.map(|Query(query)| query).map_err(|rejection| {
        tracing::warn!(error = %rejection.body_text(), "Rejected query string");
        (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": format!("Invalid query: {}", rejection.body_text()) })),
        )
            .into_response()
    })
}

async fn price_handler(
    State(resolver): State<Arc<PriceResolver>>,
    query: Result<Query<PriceQuery>, QueryRejection>,
) -> Response {
    let query = match parse_query(query) {
        Ok(query) => query,
        Err(response) => return response,
    };
    let Some(symbol) = query.symbol() else {
        return missing_symbol();
    };
    let debug = query.debug();

    match resolver.resolve(symbol).await {
        Ok(resolved) => {
            tracing::info!(
                symbol = %resolved.symbol,
                price = resolved.price,
                source = %resolved.source,
                "Price resolved"
            );
            let body = PriceBody {
                symbol: &resolved.symbol,
                price: resolved.price,
                source: &resolved.source,
                ts: Utc::now().timestamp_millis(),
                attempts: debug.then_some(resolved.attempts.as_slice()),
            };
            (
                StatusCode::OK,
                [(header::CACHE_CONTROL, CACHE_CONTROL_SUCCESS)],
                Json(body),
            )
                .into_response()
        }
        Err(e) => error_response(&e, debug),
    }
}

fn error_response(error: &PriceError, debug: bool) -> Response {
    let status = match error {
        PriceError::InvalidSymbol => StatusCode::BAD_REQUEST,
        PriceError::NotFound { .. } => StatusCode::BAD_GATEWAY,
        PriceError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status == StatusCode::INTERNAL_SERVER_ERROR {
        tracing::error!(error = %error, "Price resolution failed");
    } else {
        tracing::warn!(error = %error, "Price resolution failed");
    }

    let body = ErrorBody {
        error: error.to_string(),
        attempts: debug
            .then_some(error.attempts())
            .filter(|attempts| !attempts.is_empty()),
    };
    (status, Json(body)).into_response()
}

async fn stock_price_handler(
    State(resolver): State<Arc<PriceResolver>>,
    query: Result<Query<PriceQuery>, QueryRejection>,
) -> Response {
    let query = match parse_query(query) {
        Ok(query) => query,
        Err(response) => return response,
    };
    let Some(symbol) = query.symbol() else {
        return missing_symbol();
    };

    match resolver.quote_single(symbol).await {
        Ok(resolved) => (StatusCode::OK, Json(json!({ "price": resolved.price }))).into_response(),
        Err(e) => {
            tracing::warn!(symbol, error = %e, "Single-source quote failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Failed to fetch price" })),
            )
                .into_response()
        }
    }
}
