//! JSON serialization helpers for deterministic output.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::ser::{PrettyFormatter, Serializer};

/// Error type for serialization operations.
#[derive(Debug, thiserror::Error)]
pub enum SerializationError {
    /// JSON serialization failed.
    #[error("JSON serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    /// JSON deserialization failed.
    #[error("JSON deserialization failed: {0}")]
    Deserialize(serde_json::Error),

    /// UTF-8 encoding error.
    #[error("UTF-8 encoding error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Serializes a value to pretty JSON with a trailing newline.
///
/// Keys come out in source order, so maps that must be stable should be
/// `BTreeMap`s.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_json_stable<T: Serialize>(value: &T) -> Result<String, SerializationError> {
    let mut buffer = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"  ");
    let mut serializer = Serializer::with_formatter(&mut buffer, formatter);
    value.serialize(&mut serializer)?;

    let mut json = String::from_utf8(buffer)?;
    json.push('\n');
    Ok(json)
}

/// Same as [`to_json_stable`], as bytes for direct file writing.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_json_stable_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>, SerializationError> {
    to_json_stable(value).map(String::into_bytes)
}

/// Deserializes JSON from bytes, pretty-printed or minified.
///
/// # Errors
///
/// Returns an error if the JSON is invalid or doesn't match the expected type.
pub fn from_json_bytes<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, SerializationError> {
    serde_json::from_slice(bytes).map_err(SerializationError::Deserialize)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_stable_output_format() {
        let mut map = BTreeMap::new();
        map.insert("user_info", "{}");
        map.insert("auth_token", "tok123");

        let json = to_json_stable(&map).expect("serialization should work");

        assert_eq!(
            json,
            "{\n  \"auth_token\": \"tok123\",\n  \"user_info\": \"{}\"\n}\n"
        );
    }

    #[test]
    fn test_from_json_bytes() {
        let result: serde_json::Value =
            from_json_bytes(br#"{"base_url":"http://localhost:8000"}"#).unwrap();
        assert_eq!(result["base_url"], "http://localhost:8000");
    }

    #[test]
    fn test_from_json_bytes_rejects_garbage() {
        let result: Result<serde_json::Value, _> = from_json_bytes(b"{\"broken\": }");
        assert!(matches!(result, Err(SerializationError::Deserialize(_))));
    }
}
