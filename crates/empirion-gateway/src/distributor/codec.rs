//! Inbound frame decoding
//!
//! A frame is accepted only when it parses as a JSON object. Anything else is
//! a [`DecodeError`] and the caller drops the frame.

use serde_json::Value;

use empirion_common::DecodeError;

/// Decode a text frame into a JSON object
pub fn decode_frame(text: &str) -> Result<Value, DecodeError> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| DecodeError::InvalidJson(e.to_string()))?;

    match value {
        Value::Object(_) => Ok(value),
        Value::Null => Err(DecodeError::NotAnObject { kind: "null" }),
        Value::Bool(_) => Err(DecodeError::NotAnObject { kind: "boolean" }),
        Value::Number(_) => Err(DecodeError::NotAnObject { kind: "number" }),
        Value::String(_) => Err(DecodeError::NotAnObject { kind: "string" }),
        Value::Array(_) => Err(DecodeError::NotAnObject { kind: "array" }),
    }
}

/// Decode a binary frame; it must carry UTF-8 text
pub fn decode_bytes(bytes: &[u8]) -> Result<Value, DecodeError> {
    let text = std::str::from_utf8(bytes).map_err(|_| DecodeError::InvalidUtf8)?;
    decode_frame(text)
}
