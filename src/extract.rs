//! Best-effort price extraction from loosely shaped upstream JSON
//!
//! Upstreams disagree on schema, so a parsed body is classified into the
//! [`UpstreamBody`] shapes it could plausibly be, in priority order, and each
//! shape's extraction runs until one produces a finite number. An object with
//! a `data` array is a record list and nothing else: its paging counters are
//! not prices. A body that matches nothing yields `None`; extraction never
//! fails.

use crate::constants::PRICE_FIELDS;
use serde_json::{Map, Value};

/// Shapes an upstream body can take
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UpstreamBody<'a> {
    /// `{"data": [record, ...]}`
    RecordList(&'a [Value]),
    /// `[record, ...]`
    BareArray(&'a [Value]),
    /// `{"<SYMBOL>": record}`
    SymbolKeyed(&'a Value),
    /// Any other object, scanned shallowly
    Unknown(&'a Map<String, Value>),
}

impl<'a> UpstreamBody<'a> {
    /// Applicable shapes for `body`, highest priority first
    pub fn classify(body: &'a Value, symbol: &str) -> Vec<UpstreamBody<'a>> {
        let mut shapes = Vec::new();
        match body {
            Value::Array(items) => shapes.push(UpstreamBody::BareArray(items)),
            Value::Object(map) => match map.get("data") {
                Some(Value::Array(records)) => shapes.push(UpstreamBody::RecordList(records)),
                _ => {
                    if let Some(record) = map.get(symbol) {
                        shapes.push(UpstreamBody::SymbolKeyed(record));
                    }
                    shapes.push(UpstreamBody::Unknown(map));
                }
            },
            _ => {}
        }
        shapes
    }
}

/// Locates a price in a parsed body using an ordered field list
#[derive(Debug, Clone)]
pub struct PriceExtractor {
    fields: Vec<String>,
}

impl Default for PriceExtractor {
    fn default() -> Self {
        Self::new(PRICE_FIELDS.iter().map(|f| f.to_string()).collect())
    }
}

impl PriceExtractor {
    /// Creates an extractor scanning `fields` in order
    pub fn new(fields: Vec<String>) -> Self {
        Self { fields }
    }

    /// Extracts the first finite price from `body`
    pub fn extract(&self, body: &Value, symbol: &str) -> Option<f64> {
        UpstreamBody::classify(body, symbol)
            .into_iter()
            .find_map(|shape| self.extract_shape(shape))
    }

    fn extract_shape(&self, shape: UpstreamBody<'_>) -> Option<f64> {
        match shape {
            UpstreamBody::RecordList(records) => records.first().and_then(|r| self.scan_fields(r)),
            UpstreamBody::BareArray(items) => {
                let first = items.first()?;
                self.scan_fields(first).or_else(|| first_number_in(first))
            }
            UpstreamBody::SymbolKeyed(record) => self.scan_fields(record),
            UpstreamBody::Unknown(map) => map.values().find_map(|value| match value {
                Value::Number(_) => finite_number(value),
                Value::Object(_) => self.scan_fields(value),
                _ => None,
            }),
        }
    }

    /// First configured field of `record` holding a finite number
    fn scan_fields(&self, record: &Value) -> Option<f64> {
        let map = record.as_object()?;
        self.fields
            .iter()
            .find_map(|field| map.get(field).and_then(finite_number))
    }
}

/// Finite number from a JSON number or numeric string
pub fn finite_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    number.is_finite().then_some(number)
}

fn first_number_in(value: &Value) -> Option<f64> {
    match value {
        Value::Object(map) => map.values().find_map(finite_number),
        Value::Array(items) => items.iter().find_map(finite_number),
        _ => None,
    }
}
