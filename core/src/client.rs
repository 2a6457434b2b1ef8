//! The request dispatcher every endpoint funnels through.
//!
//! # Design
//! `Client` holds an immutable `ClientConfig` and a `Transport`. A call is
//! split into three steps:
//! - `build_request` turns a relative path, optional payload and optional
//!   method override into an `HttpRequest` (pure, no I/O);
//! - the configured hook adjusts transfer options and the transport runs
//!   the round trip;
//! - `parse_response` classifies the outcome and decodes the body (pure).
//!
//! `send` chains the three. Callers running their own HTTP stack can use
//! the two pure halves directly.

use std::fmt;

use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::{ApiError, ResponseCodeError};
use crate::hook::RequestContext;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, TransferOptions, TransportError};
use crate::transport::{Transport, UreqTransport};
use crate::types::{Payload, Response};

/// Blocking client for the Ecomail API.
///
/// Holds no per-call state, so one instance can serve many threads.
#[derive(Clone)]
pub struct Client<T = UreqTransport> {
    config: ClientConfig,
    transport: T,
}

impl<T> fmt::Debug for Client<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Client<UreqTransport> {
    pub fn new(config: ClientConfig) -> Self {
        Self::with_transport(config, UreqTransport::new())
    }
}

impl<T: Transport> Client<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Run one request against `{server}/{path}`.
    ///
    /// Without an override the method is POST when a payload is given and
    /// GET otherwise.
    pub fn send(
        &self,
        path: &str,
        payload: Option<&Payload>,
        method: Option<HttpMethod>,
    ) -> Result<Response, ApiError> {
        let mut request = self.build_request(path, payload, method)?;

        if let Some(hook) = self.config.hook() {
            let context = RequestContext {
                path,
                payload,
                method_override: method,
                method: request.method,
            };
            hook.before_transfer(&mut request.options, &context);
        }

        debug!(method = %request.method, path, "sending request");
        let outcome = self.transport.execute(&request);
        let result = self.parse_response(outcome);
        if let Err(err) = &result {
            warn!(
                method = %request.method,
                path,
                status = ?err.http_status(),
                error = %first_line(&err.to_string()),
                "request failed"
            );
        }
        result
    }

    /// Build the request `send` would execute, minus hook adjustments.
    pub fn build_request(
        &self,
        path: &str,
        payload: Option<&Payload>,
        method: Option<HttpMethod>,
    ) -> Result<HttpRequest, ApiError> {
        let method = method.unwrap_or(match payload {
            Some(_) => HttpMethod::Post,
            None => HttpMethod::Get,
        });
        let body = payload
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| ApiError::Encoding(e.to_string()))?;

        Ok(HttpRequest {
            method,
            url: format!("{}/{}", self.config.server(), path),
            headers: vec![
                ("key".to_string(), self.config.api_key().to_string()),
                ("Content-Type".to_string(), "application/json".to_string()),
            ],
            body,
            options: TransferOptions::default(),
        })
    }

    /// Classify a round trip and decode its body under the configured
    /// format.
    pub fn parse_response(
        &self,
        outcome: Result<HttpResponse, TransportError>,
    ) -> Result<Response, ApiError> {
        let response = match outcome {
            Ok(response) => response,
            Err(err) => {
                return Err(ApiError::InvalidResponseCode(ResponseCodeError::new(
                    err.message,
                    Some(err.kind),
                    None,
                    None,
                )));
            }
        };

        check_status(&response)?;
        Response::decode(self.config.format(), response.body).map_err(ApiError::InvalidResponseFormat)
    }
}

/// Map non-2xx statuses to the matching `ApiError` variant.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    match response.status {
        200..=299 => Ok(()),
        429 => Err(ApiError::RequestsLimitExceeded),
        401 => Err(ApiError::InvalidApiKey),
        status => {
            let error_body = serde_json::from_str(&response.body).ok();
            Err(ApiError::InvalidResponseCode(ResponseCodeError::new(
                "",
                None,
                Some(status),
                error_body,
            )))
        }
    }
}

fn first_line(message: &str) -> &str {
    message.lines().next().unwrap_or_default()
}
