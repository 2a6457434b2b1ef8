//! Error types for the Ecomail client.
//!
//! # Design
//! The API documents two statuses with dedicated meaning, 429 (rate limit)
//! and 401 (bad key); both get fixed-message variants and never look at the
//! body. Every other failed round trip, including transport failures that
//! never reached a status, lands in `InvalidResponseCode` together with
//! whatever the server said. A 2xx whose body does not decode is
//! `InvalidResponseFormat`.

use serde::Serialize;
use serde_json::error::Category;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;
use thiserror::Error;

use crate::http::TransportErrorKind;

/// Errors returned by `Client` calls.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server answered 429.
    #[error("Requests limit (1000 per minute)")]
    RequestsLimitExceeded,

    /// The server answered 401.
    #[error("Invalid API key")]
    InvalidApiKey,

    /// Any other non-2xx status, or a transfer that failed outright.
    #[error("{0}")]
    InvalidResponseCode(ResponseCodeError),

    /// A 2xx body that is not valid JSON under a JSON response format.
    #[error("{0}")]
    InvalidResponseFormat(DecodeError),

    /// The request payload could not be turned into a JSON object.
    #[error("payload encoding failed: {0}")]
    Encoding(String),

    #[error("invalid configuration: {0}")]
    Configuration(String),
}

impl ApiError {
    /// HTTP status behind this error, if one was received.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            ApiError::RequestsLimitExceeded => Some(429),
            ApiError::InvalidApiKey => Some(401),
            ApiError::InvalidResponseCode(err) => err.http_status,
            _ => None,
        }
    }
}

/// Details of a failed round trip.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseCodeError {
    pub message: String,
    /// Set when the transfer itself failed.
    pub transport: Option<TransportErrorKind>,
    pub http_status: Option<u16>,
    /// Decoded body, kept only when it is a JSON object or array.
    pub error_response: Option<Value>,
}

impl ResponseCodeError {
    /// Builds the error, deriving the message when the transport gave none
    /// and appending the decoded error body.
    pub fn new(
        message: impl Into<String>,
        transport: Option<TransportErrorKind>,
        http_status: Option<u16>,
        error_response: Option<Value>,
    ) -> Self {
        let mut message = message.into();
        if message.is_empty() {
            message = match http_status {
                Some(status) if !(200..300).contains(&status) => {
                    format!("Invalid response HTTP code: {status}")
                }
                _ => "Unknown error".to_string(),
            };
        }

        let error_response = error_response.filter(|v| v.is_object() || v.is_array());
        if let Some(body) = &error_response {
            message.push_str("\n\nError response:\n");
            message.push_str(&pretty_print(body));
        }

        Self {
            message,
            transport,
            http_status,
            error_response,
        }
    }
}

impl std::fmt::Display for ResponseCodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Four-space indentation, matching what the API's own tooling prints.
fn pretty_print(value: &Value) -> String {
    let mut out = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(b"    "));
    match value.serialize(&mut ser) {
        Ok(()) => String::from_utf8_lossy(&out).into_owned(),
        Err(_) => value.to_string(),
    }
}

/// Why a success body could not be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid response format: {message}")]
pub struct DecodeError {
    pub message: String,
    pub category: Category,
    pub line: usize,
    pub column: usize,
}

impl From<serde_json::Error> for DecodeError {
    fn from(err: serde_json::Error) -> Self {
        Self {
            message: err.to_string(),
            category: err.classify(),
            line: err.line(),
            column: err.column(),
        }
    }
}
