//! Executing requests over the network.
//!
//! # Design
//! The dispatcher only knows the `Transport` trait. `UreqTransport` is the
//! blocking default; tests and embedders can plug in anything that turns an
//! `HttpRequest` into an `HttpResponse`.

use tracing::debug;
use ureq::{Agent, RequestBuilder};

use crate::http::{HttpMethod, HttpRequest, HttpResponse, TransportError, TransportErrorKind};

/// Executes one request and reports what came back.
///
/// Non-2xx statuses are not errors at this level; only a transfer that never
/// produced a status is.
pub trait Transport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).execute(request)
    }
}

/// Blocking transport backed by a `ureq::Agent`.
///
/// The agent pools connections and is cheap to clone; TLS and proxy settings
/// belong to the agent, per-request settings arrive in
/// `HttpRequest::options`. Redirects are not followed unless
/// `TransferOptions::max_redirects` asks for them, so a 3xx reaches status
/// classification like any other non-2xx.
#[derive(Clone)]
pub struct UreqTransport {
    agent: Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .max_redirects(0)
            .build()
            .new_agent();
        Self { agent }
    }

    /// Use a preconfigured agent. Status handling and the redirect policy
    /// are still overridden per request.
    pub fn with_agent(agent: Agent) -> Self {
        Self { agent }
    }

    fn prepare<B>(&self, mut builder: RequestBuilder<B>, request: &HttpRequest) -> RequestBuilder<B> {
        for (name, value) in request.headers.iter().chain(&request.options.extra_headers) {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let options = &request.options;
        let mut config = builder.config().http_status_as_error(false);
        if options.timeout.is_some() {
            config = config.timeout_global(options.timeout);
        }
        if options.connect_timeout.is_some() {
            config = config.timeout_connect(options.connect_timeout);
        }
        config
            .max_redirects(options.max_redirects.unwrap_or(0))
            .max_redirects_will_error(false)
            .build()
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let url = request.url.as_str();
        let body = request.body.as_deref().map(str::as_bytes);

        let result = match (request.method, body) {
            (HttpMethod::Get, None) => self.prepare(self.agent.get(url), request).call(),
            (HttpMethod::Get, Some(body)) => self
                .prepare(self.agent.get(url), request)
                .force_send_body()
                .send(body),
            (HttpMethod::Post, None) => self.prepare(self.agent.post(url), request).send_empty(),
            (HttpMethod::Post, Some(body)) => self.prepare(self.agent.post(url), request).send(body),
            (HttpMethod::Put, None) => self.prepare(self.agent.put(url), request).send_empty(),
            (HttpMethod::Put, Some(body)) => self.prepare(self.agent.put(url), request).send(body),
            (HttpMethod::Delete, None) => self.prepare(self.agent.delete(url), request).call(),
            (HttpMethod::Delete, Some(body)) => self
                .prepare(self.agent.delete(url), request)
                .force_send_body()
                .send(body),
        };

        let mut response = result.map_err(transport_error)?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        // A status, once received, is always returned.
        let body = match response.body_mut().with_config().limit(u64::MAX).read_to_vec() {
            Ok(bytes) => into_text(bytes),
            Err(err) if (200..300).contains(&status) => return Err(transport_error(err)),
            Err(err) => {
                debug!(status, error = %err, "error body unreadable, keeping status");
                String::new()
            }
        };

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

/// Valid UTF-8 is kept byte for byte; anything else is decoded lossily.
fn into_text(bytes: Vec<u8>) -> String {
    String::from_utf8(bytes).unwrap_or_else(|err| String::from_utf8_lossy(err.as_bytes()).into_owned())
}

fn transport_error(err: ureq::Error) -> TransportError {
    let kind = match &err {
        ureq::Error::HostNotFound => TransportErrorKind::HostNotFound,
        ureq::Error::ConnectionFailed => TransportErrorKind::Connect,
        ureq::Error::Timeout(_) => TransportErrorKind::Timeout,
        ureq::Error::Io(io) => match io.kind() {
            std::io::ErrorKind::ConnectionRefused
            | std::io::ErrorKind::ConnectionReset
            | std::io::ErrorKind::ConnectionAborted => TransportErrorKind::Connect,
            std::io::ErrorKind::TimedOut => TransportErrorKind::Timeout,
            _ => TransportErrorKind::Io,
        },
        _ => TransportErrorKind::Other,
    };
    TransportError::new(kind, err.to_string())
}
