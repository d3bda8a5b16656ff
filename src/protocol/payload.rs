//! Structured payload carried by the `/json` route.
//!
//! # Format
//!
//! ```json
//! { "Msg": "hello", "Path": "/json" }
//! ```
//!
//! The text must be a JSON object and both keys are required. Extra keys
//! are ignored. Any other JSON value (array, string, number, ...) is
//! rejected rather than coerced into the record.

// ============================================================================
// Imports
// ============================================================================

use serde::de::{Error as _, Unexpected};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

// ============================================================================
// Payload
// ============================================================================

/// Two-field record exchanged by the structured framing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payload {
    /// Free-form message text.
    #[serde(rename = "Msg")]
    pub message: String,

    /// Path the client believes it is talking to.
    #[serde(rename = "Path")]
    pub path: String,
}

impl Payload {
    /// Creates a new payload.
    #[inline]
    #[must_use]
    pub fn new(message: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            path: path.into(),
        }
    }

    /// Parses a payload from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`](crate::Error::Json) if the text is not a JSON
    /// object with string `Msg` and `Path` keys.
    pub fn from_json(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        if !value.is_object() {
            let unexpected = Unexpected::Other(json_kind(&value));
            return Err(serde_json::Error::invalid_type(unexpected, &"a JSON object").into());
        }
        Ok(serde_json::from_value(value)?)
    }

    /// Encodes the payload as JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`](crate::Error::Json) if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Name of a JSON value's type, for decode errors.
fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use crate::error::Error;

    #[test]
    fn test_decode_wire_keys() {
        let payload = Payload::from_json(r#"{"Msg":"hi","Path":"/json"}"#).expect("valid payload");
        assert_eq!(payload, Payload::new("hi", "/json"));
    }

    #[test]
    fn test_encode_uses_wire_keys() {
        let json = Payload::new("hi", "/json").to_json().expect("encode");
        assert_eq!(json, r#"{"Msg":"hi","Path":"/json"}"#);
    }

    #[test]
    fn test_missing_field_is_rejected() {
        let err = Payload::from_json(r#"{"Msg":"hi"}"#).unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn test_wrong_type_is_rejected() {
        let err = Payload::from_json(r#"{"Msg":42,"Path":"/json"}"#).unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn test_not_json_is_rejected() {
        assert!(Payload::from_json("hello").is_err());
        assert!(Payload::from_json("").is_err());
        assert!(Payload::from_json(r#"{"Msg":"hi","Path":"/json""#).is_err());
    }

    #[test]
    fn test_array_form_is_rejected() {
        let err = Payload::from_json(r#"["hi","/json"]"#).unwrap_err();
        assert!(matches!(err, Error::Json(_)));
        assert!(err.to_string().contains("array"));
    }

    #[test]
    fn test_non_object_values_are_rejected() {
        for text in [r#""hi""#, "42", "null", "true"] {
            let err = Payload::from_json(text).unwrap_err();
            assert!(matches!(err, Error::Json(_)), "accepted {text}");
        }
    }

    #[test]
    fn test_extra_keys_are_ignored() {
        let payload = Payload::from_json(r#"{"Msg":"a","Path":"/b","Extra":true}"#)
            .expect("extra keys allowed");
        assert_eq!(payload, Payload::new("a", "/b"));
    }

    #[test]
    fn test_escaped_text_survives() {
        let original = Payload::new("line\n\"quoted\" ✓", "/json");
        let decoded = Payload::from_json(&original.to_json().expect("encode")).expect("decode");
        assert_eq!(decoded, original);
    }
}
