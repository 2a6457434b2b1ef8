//! Request payloads and decoded responses.
//!
//! # Design
//! The API accepts arbitrary JSON objects per endpoint, so payloads are an
//! ordered `serde_json` map rather than one DTO per call. Endpoint methods
//! take anything `Serialize` and convert it here; values that do not end up
//! as a JSON object are rejected before a request is built.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::ResponseFormat;
use crate::error::{ApiError, DecodeError};

/// Key-ordered request body.
pub type Payload = Map<String, Value>;

/// Convert any serializable value into a request payload.
pub fn to_payload<P: Serialize + ?Sized>(data: &P) -> Result<Payload, ApiError> {
    match serde_json::to_value(data) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(ApiError::Encoding(format!(
            "payload must be a JSON object, got {}",
            kind_of(&other)
        ))),
        Err(e) => Err(ApiError::Encoding(e.to_string())),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// A decoded success body. The variant follows the configured
/// `ResponseFormat`; the data inside never differs between the two JSON
/// variants.
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    /// `ResponseFormat::JsonArray`: objects are walked as ordered maps.
    Array(Value),
    /// `ResponseFormat::JsonObject`: objects are read as attribute records,
    /// typically through [`Response::deserialize`].
    Object(Value),
    /// `ResponseFormat::PlainText`: the body exactly as received.
    Text(String),
}

impl Response {
    /// Decode `body` according to `format`.
    pub(crate) fn decode(format: ResponseFormat, body: String) -> Result<Self, DecodeError> {
        match format {
            ResponseFormat::JsonArray => Ok(Response::Array(serde_json::from_str(&body)?)),
            ResponseFormat::JsonObject => Ok(Response::Object(serde_json::from_str(&body)?)),
            ResponseFormat::PlainText => Ok(Response::Text(body)),
        }
    }

    pub fn format(&self) -> ResponseFormat {
        match self {
            Response::Array(_) => ResponseFormat::JsonArray,
            Response::Object(_) => ResponseFormat::JsonObject,
            Response::Text(_) => ResponseFormat::PlainText,
        }
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Response::Array(v) | Response::Object(v) => Some(v),
            Response::Text(_) => None,
        }
    }

    pub fn into_value(self) -> Option<Value> {
        match self {
            Response::Array(v) | Response::Object(v) => Some(v),
            Response::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Response::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Top-level field lookup for JSON bodies.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_value().and_then(|v| v.get(key))
    }

    /// Deserialize into a caller-defined type. Text bodies are parsed on
    /// demand, so this also works with `ResponseFormat::PlainText`.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        let result = match self {
            Response::Array(v) | Response::Object(v) => serde_json::from_value(v.clone()),
            Response::Text(s) => serde_json::from_str(s),
        };
        result.map_err(|e| ApiError::InvalidResponseFormat(e.into()))
    }
}
