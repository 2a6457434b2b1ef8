//! Pre-transfer customization hook.
//!
//! A hook sees the request the dispatcher is about to send and may adjust
//! transport settings (timeouts, redirects, extra headers). The path,
//! payload and method are handed over read-only.

use crate::http::{HttpMethod, TransferOptions};
use crate::types::Payload;

/// What the dispatcher is about to send.
#[derive(Debug, Clone, Copy)]
pub struct RequestContext<'a> {
    /// Relative path as passed to `send`.
    pub path: &'a str,
    pub payload: Option<&'a Payload>,
    /// The explicit override, if the endpoint passed one.
    pub method_override: Option<HttpMethod>,
    /// The method that will go on the wire.
    pub method: HttpMethod,
}

/// Invoked once per request, right before the transport runs.
pub trait RequestHook: Send + Sync {
    fn before_transfer(&self, options: &mut TransferOptions, context: &RequestContext<'_>);
}

impl<F> RequestHook for F
where
    F: Fn(&mut TransferOptions, &RequestContext<'_>) + Send + Sync,
{
    fn before_transfer(&self, options: &mut TransferOptions, context: &RequestContext<'_>) {
        self(options, context)
    }
}
