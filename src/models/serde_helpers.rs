//! Lenient serde helpers for hand-edited JSON data
//!
//! Dance data is maintained by hand, so numeric fields turn up as numbers,
//! numeric strings, or empty strings depending on who edited the file.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Interpret a JSON value as a non-negative integer
///
/// Accepts integers, integral floats and trimmed numeric strings.
/// Everything else (including the empty string) is `None`.
pub fn value_as_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| *f >= 0.0 && f.fract() == 0.0 && *f <= u32::MAX as f64)
                .map(|f| f as u64)
        }),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    }
}

/// Interpret a JSON value as display text
///
/// Strings are trimmed; numbers and booleans are rendered with `to_string`.
pub fn value_as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Deserialize an optional `u32` from a number or numeric string
pub fn lenient_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(value_as_u64)
        .and_then(|n| u32::try_from(n).ok()))
}

/// Deserialize a `u32` from a number or numeric string, defaulting to zero
pub fn u32_or_zero<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_u32(deserializer)?.unwrap_or(0))
}

/// Deserialize an optional `u8` from a number or numeric string
pub fn lenient_u8<'de, D>(deserializer: D) -> Result<Option<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(value_as_u64)
        .and_then(|n| u8::try_from(n).ok()))
}

/// Deserialize optional text from a string or a number
///
/// Blank strings collapse to `None` so that `""` from a `<select>` means "unset".
pub fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(value_as_text))
}

/// Deserialize text from a string or number, defaulting to the empty string
pub fn text_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_text(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_value_as_u64_accepts_numbers_and_numeric_strings() {
        assert_eq!(value_as_u64(&json!(32)), Some(32));
        assert_eq!(value_as_u64(&json!(48.0)), Some(48));
        assert_eq!(value_as_u64(&json!(" 40 ")), Some(40));
        assert_eq!(value_as_u64(&json!("")), None);
        assert_eq!(value_as_u64(&json!("3x32")), None);
        assert_eq!(value_as_u64(&json!(-1)), None);
        assert_eq!(value_as_u64(&json!(null)), None);
    }

    #[test]
    fn test_value_as_text_trims_and_drops_blank() {
        assert_eq!(value_as_text(&json!("  reel ")), Some("reel".to_string()));
        assert_eq!(value_as_text(&json!("   ")), None);
        assert_eq!(value_as_text(&json!(8)), Some("8".to_string()));
        assert_eq!(value_as_text(&json!([1])), None);
    }
}
