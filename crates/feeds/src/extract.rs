//! Tolerant price extraction.
//!
//! Upstream payloads are inconsistent and undocumented, so extraction is an
//! ordered list of typed extractors over a `serde_json::Value`. Each returns
//! `Option<f64>` and the first `Some` wins. Missing fields and wrong types are
//! never errors.

use serde_json::Value;
use token_monitor_core::is_usable_price;
use tracing::trace;

/// A single extraction attempt.
pub type Extractor = fn(&Value) -> Option<f64>;

/// Field names that carry a USD price.
const PRICE_FIELDS: &[&str] = &["price", "priceUSD", "priceUsd"];

/// Field names checked inside a `result` object.
const RESULT_PRICE_FIELDS: &[&str] = &["price", "priceUSD"];

/// Extractors in priority order, labelled by payload shape.
pub const EXTRACTORS: &[(&str, Extractor)] = &[
    ("data", nested_data_price),
    ("top-level", top_level_price),
    ("result", nested_result_price),
    ("pairs", best_liquidity_pair_price),
];

/// Extract a price from an arbitrary payload, trying known shapes in order.
pub fn extract_price(payload: &Value) -> Option<f64> {
    EXTRACTORS.iter().find_map(|(shape, extractor)| {
        let price = extractor(payload)?;
        trace!(shape = *shape, price, "Extracted price");
        Some(price)
    })
}

/// Read a price from a JSON number or numeric string.
pub fn as_price(value: &Value) -> Option<f64> {
    let price = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    is_usable_price(price).then_some(price)
}

/// First usable price among `fields` of an object.
pub fn first_price_field(object: &Value, fields: &[&str]) -> Option<f64> {
    let object = object.as_object()?;
    fields
        .iter()
        .find_map(|field| object.get(*field).and_then(as_price))
}

/// `{"data": {"price": ...}}`
fn nested_data_price(payload: &Value) -> Option<f64> {
    first_price_field(payload.get("data")?, PRICE_FIELDS)
}

/// `{"price": ...}`
fn top_level_price(payload: &Value) -> Option<f64> {
    first_price_field(payload, PRICE_FIELDS)
}

/// `{"result": {"price": ...}}`
fn nested_result_price(payload: &Value) -> Option<f64> {
    first_price_field(payload.get("result")?, RESULT_PRICE_FIELDS)
}

/// `{"pairs": [...]}`
fn best_liquidity_pair_price(payload: &Value) -> Option<f64> {
    let pairs = payload.get("pairs")?.as_array()?;
    let pair = rank_by_liquidity(pairs.iter()).into_iter().next()?;
    pair_price(pair)
}

/// USD liquidity of a trading pair record, 0 when absent.
pub fn liquidity_usd(pair: &Value) -> f64 {
    pair.get("liquidity")
        .and_then(|l| l.get("usd"))
        .and_then(|usd| match usd {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        })
        .filter(|usd| usd.is_finite())
        .unwrap_or(0.0)
}

/// Sort pair records by descending USD liquidity. Ties keep input order.
pub fn rank_by_liquidity<'a>(pairs: impl Iterator<Item = &'a Value>) -> Vec<&'a Value> {
    let mut ranked: Vec<&Value> = pairs.collect();
    ranked.sort_by(|a, b| liquidity_usd(b).total_cmp(&liquidity_usd(a)));
    ranked
}

/// Price of a single pair record.
pub fn pair_price(pair: &Value) -> Option<f64> {
    first_price_field(pair, &["priceUsd", "price"])
}
