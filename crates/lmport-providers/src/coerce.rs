//! Lenient readers for loosely-typed export fields.
//!
//! Export archives are produced by several generations of tooling, so almost
//! any field can be missing, `null`, or of the wrong type. Everything here
//! degrades to a default instead of failing.

use lmport_types::Clock;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Values above this are already milliseconds
const MILLIS_THRESHOLD: f64 = 1e12;

/// `deserialize_with` helper: wrong-typed values fall back to `T::default()`
pub(crate) fn lenient<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// Truthiness of a JSON value: `null`, `false`, `0`, `""`, `[]`, `{}` are false
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// First truthy value, or `Value::Null`
pub fn first_truthy<'a>(candidates: impl IntoIterator<Item = &'a Value>) -> &'a Value {
    const NULL: &Value = &Value::Null;
    candidates
        .into_iter()
        .find(|v| is_truthy(v))
        .unwrap_or(NULL)
}

/// First non-empty string among the candidates
pub(crate) fn first_non_empty<'a>(
    candidates: impl IntoIterator<Item = &'a Option<String>>,
) -> Option<&'a str> {
    candidates
        .into_iter()
        .filter_map(|c| c.as_deref())
        .find(|s| !s.is_empty())
}

/// Raw title of a source conversation (`title`, then `name`), untrimmed
pub fn source_title(conversation: &Value) -> String {
    ["title", "name"]
        .iter()
        .filter_map(|key| conversation.get(key).and_then(Value::as_str))
        .find(|s| !s.is_empty())
        .unwrap_or_default()
        .to_string()
}

/// Convert a seconds-or-milliseconds timestamp to integer milliseconds.
///
/// Accepts numbers and numeric strings. Anything else (including absent
/// values) falls back to `clock.now_millis()`, which makes the result
/// non-deterministic unless a fixed clock is injected.
pub fn to_millis(value: &Value, clock: &dyn Clock) -> i64 {
    match seconds_of(value) {
        Some(ts) if ts > MILLIS_THRESHOLD => ts as i64,
        Some(ts) => (ts * 1000.0).round() as i64,
        None => {
            tracing::warn!(value = %value, "unusable timestamp, falling back to current time");
            clock.now_millis()
        }
    }
}

fn seconds_of(value: &Value) -> Option<f64> {
    let ts = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    ts.is_finite().then_some(ts)
}
