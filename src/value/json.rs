//! Conversion from JSON documents
//!
//! Filters arrive as JSON. Types JSON cannot express are written in
//! extended-JSON form:
//!
//! | Form                                              | Value          |
//! |---------------------------------------------------|----------------|
//! | `{"$minKey": 1}` / `{"$maxKey": 1}`               | MinKey/MaxKey  |
//! | `{"$undefined": true}`                            | Undefined      |
//! | `{"$regularExpression": {"pattern", "options"}}`  | Regex          |
//! | `{"$date": <millis or RFC 3339 string>}`          | Date           |
//! | `{"$numberDouble": "NaN" / "Infinity" / "1.5"}`   | Double         |
//! | `{"$numberInt": "5"}` / `{"$numberLong": "5"}`    | Int            |

use serde_json::{Map, Value as Json};

use super::types::Value;

/// Convert a JSON value into a document value.
pub fn from_json(json: &Json) -> Value {
    match json {
        Json::Null => Value::Null,
        Json::Bool(b) => Value::Bool(*b),
        Json::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Int(i)
            } else {
                Value::Double(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        Json::String(s) => Value::String(s.clone()),
        Json::Array(items) => Value::Array(items.iter().map(from_json).collect()),
        Json::Object(map) => match extended_literal(map) {
            Some(v) => v,
            None => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), from_json(v)))
                    .collect(),
            ),
        },
    }
}

/// Recognize a single-field extended-JSON literal.
///
/// Returns None for ordinary objects, including malformed literals.
pub fn extended_literal(map: &Map<String, Json>) -> Option<Value> {
    if map.len() != 1 {
        return None;
    }
    let (key, inner) = map.iter().next()?;

    match key.as_str() {
        "$minKey" => Some(Value::MinKey),
        "$maxKey" => Some(Value::MaxKey),
        "$undefined" => Some(Value::Undefined),
        "$regularExpression" => {
            let obj = inner.as_object()?;
            let pattern = obj.get("pattern")?.as_str()?;
            let options = obj.get("options").and_then(Json::as_str).unwrap_or("");
            Some(Value::regex(pattern, sorted_flags(options)))
        }
        "$date" => parse_date(inner).map(Value::Date),
        "$numberDouble" => parse_double(inner.as_str()?).map(Value::Double),
        "$numberInt" | "$numberLong" => inner.as_str()?.parse::<i64>().ok().map(Value::Int),
        _ => None,
    }
}

/// Returns true if the object is an extended-JSON literal rather than an
/// operator document.
pub fn is_extended_literal(map: &Map<String, Json>) -> bool {
    extended_literal(map).is_some()
}

/// Regex flags are order-insensitive; keep them sorted so equal regexes
/// render and compare identically.
pub fn sorted_flags(flags: &str) -> String {
    let mut chars: Vec<char> = flags.chars().collect();
    chars.sort_unstable();
    chars.dedup();
    chars.into_iter().collect()
}

fn parse_double(s: &str) -> Option<f64> {
    match s {
        "NaN" => Some(f64::NAN),
        "Infinity" => Some(f64::INFINITY),
        "-Infinity" => Some(f64::NEG_INFINITY),
        other => other.parse::<f64>().ok(),
    }
}

fn parse_date(inner: &Json) -> Option<i64> {
    match inner {
        Json::Number(n) => n.as_i64(),
        Json::String(s) => chrono::DateTime::parse_from_rfc3339(s)
            .ok()
            .map(|dt| dt.timestamp_millis()),
        Json::Object(obj) => obj.get("$numberLong")?.as_str()?.parse::<i64>().ok(),
        _ => None,
    }
}
