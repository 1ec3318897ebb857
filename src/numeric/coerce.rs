use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Returns the value only when it is a finite number.
pub fn safe_number(value: Option<f64>) -> Option<f64> {
    value.filter(|n| n.is_finite())
}

/// Finite and non-zero. Subject fields use this: a zero sqft or bed count
/// carries no evidence.
pub fn nonzero_number(value: Option<f64>) -> Option<f64> {
    safe_number(value).filter(|n| *n != 0.0)
}

/// Coerce an arbitrary JSON value into a finite number.
///
/// Numbers pass through, numeric strings are parsed after trimming, and
/// everything else (empty strings, booleans, objects, non-finite results)
/// is `None`.
pub fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|n| n.is_finite()),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
        }
        _ => None,
    }
}

pub fn clamp01(n: f64) -> f64 {
    n.clamp(0.0, 1.0)
}

/// serde helper: accept numbers, numeric strings, null, or garbage; garbage
/// becomes `None` instead of a deserialization error.
pub(crate) fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(coerce_number))
}

/// serde helper: identifiers arrive as strings or bare numbers.
pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}
