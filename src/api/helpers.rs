//! Shared helpers for the WASM API
//!
//! Conversion between `JsValue` and the serde types of the core, with
//! failures logged and turned into string errors for JavaScript.

use serde::de::DeserializeOwned;
use serde::Serialize;
use wasm_bindgen::prelude::*;

// ============================================================================
// Serialization/Deserialization Helpers
// ============================================================================

/// Deserialize a value from JavaScript with automatic error handling
pub fn deserialize<T: DeserializeOwned>(value: JsValue, error_context: &str) -> Result<T, JsValue> {
    serde_wasm_bindgen::from_value(value).map_err(|e| {
        let msg = format!("{}: {}", error_context, e);
        log::error!("{}", msg);
        JsValue::from_str(&msg)
    })
}

/// Like [`deserialize`], but `undefined` and `null` yield the default
pub fn deserialize_or_default<T: DeserializeOwned + Default>(
    value: JsValue,
    error_context: &str,
) -> Result<T, JsValue> {
    if value.is_undefined() || value.is_null() {
        return Ok(T::default());
    }
    deserialize(value, error_context)
}

/// Serialize a value to JavaScript with automatic error handling
///
/// Maps serialize as plain objects rather than `Map`s.
pub fn serialize<T: Serialize>(value: &T, error_context: &str) -> Result<JsValue, JsValue> {
    let serializer = serde_wasm_bindgen::Serializer::new().serialize_maps_as_objects(true);
    value.serialize(&serializer).map_err(|e| {
        let msg = format!("{}: {}", error_context, e);
        log::error!("{}", msg);
        JsValue::from_str(&msg)
    })
}

// ============================================================================
// Validation Helpers
// ============================================================================

/// Validate an index coming from JavaScript
///
/// Negative or fractional numbers are rejected before they can wrap.
pub fn validate_index(index: f64, context: &str) -> Result<usize, String> {
    if !index.is_finite() || index < 0.0 || index.fract() != 0.0 {
        return Err(format!("{} index {} is not a valid position", context, index));
    }
    Ok(index as usize)
}

/// Validate a navigation offset coming from JavaScript
pub fn validate_delta(delta: f64, context: &str) -> Result<isize, String> {
    if !delta.is_finite() || delta.fract() != 0.0 {
        return Err(format!("{} offset {} is not a whole number", context, delta));
    }
    Ok(delta as isize)
}

// ============================================================================
// Result Conversion Helpers
// ============================================================================

/// Convert a validation error to a JsValue
pub fn validation_error(msg: impl Into<String>) -> JsValue {
    let msg = msg.into();
    log::error!("{}", msg);
    JsValue::from_str(&msg)
}
