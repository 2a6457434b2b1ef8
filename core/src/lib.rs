//! Blocking client for the Ecomail marketing-automation API.
//!
//! # Overview
//! Every endpoint method (`show_list`, `add_subscriber`, `send_campaign`,
//! ...) builds a relative path and hands it to a single dispatcher,
//! `Client::send`, which attaches the API key, serializes the payload, runs
//! the transfer and classifies the response.
//!
//! # Design
//! - `Client` is immutable after construction; it holds a `ClientConfig`
//!   and a `Transport`.
//! - The dispatcher is split into pure `build_request` / `parse_response`
//!   halves around the transport, so the I/O boundary is explicit and the
//!   classification logic is testable without a network.
//! - Payloads are ordered JSON maps; responses come back as JSON values or
//!   raw text depending on `ResponseFormat`.
//! - No retries, backoff or timeouts are built in. A `RequestHook` can set
//!   transfer options per request.
//!
//! ```no_run
//! use ecomail_core::{Client, ClientConfig, ResponseFormat};
//! use serde_json::json;
//!
//! let client = Client::new(ClientConfig::new("api-key").with_format(ResponseFormat::JsonObject));
//! client.add_subscriber(7, &json!({"subscriber_data": {"email": "a@b.com"}}))?;
//! # Ok::<(), ecomail_core::ApiError>(())
//! ```

pub mod client;
pub mod config;
mod endpoints;
pub mod error;
pub mod hook;
pub mod http;
pub mod transport;
pub mod types;

#[cfg(test)]
mod test_support;

pub use client::Client;
pub use config::{ClientConfig, ResponseFormat, DEFAULT_SERVER};
pub use error::{ApiError, DecodeError, ResponseCodeError};
pub use hook::{RequestContext, RequestHook};
pub use http::{HttpMethod, HttpRequest, HttpResponse, TransferOptions, TransportError, TransportErrorKind};
pub use transport::{Transport, UreqTransport};
pub use types::{to_payload, Payload, Response};
