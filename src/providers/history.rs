//! Daily-history fallback body (TradingView UDF `history` format)

use crate::extract::finite_number;
use serde::Deserialize;
use serde_json::Value;

/// `{"s": "ok", "t": [...], "c": [...], ...}`; only status and closes matter
#[derive(Debug, Deserialize)]
struct DailyHistory {
    #[serde(default)]
    s: Option<String>,
    #[serde(default)]
    c: Option<Vec<Value>>,
}

/// Most recent daily close, if the body reports `ok` and has closes
pub fn latest_close(body: &Value) -> Option<f64> {
    let history = DailyHistory::deserialize(body).ok()?;

    if !history.s?.eq_ignore_ascii_case("ok") {
        return None;
    }

    history.c?.last().and_then(finite_number)
}
