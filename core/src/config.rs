//! Client configuration.
//!
//! `ClientConfig` is assembled with builder methods and then moved into a
//! `Client`, after which it is only readable.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::ApiError;
use crate::hook::RequestHook;

/// Production API origin.
pub const DEFAULT_SERVER: &str = "https://api2.ecomailapp.cz";

pub const ENV_API_KEY: &str = "ECOMAIL_API_KEY";
pub const ENV_SERVER: &str = "ECOMAIL_SERVER";
pub const ENV_RESPONSE_FORMAT: &str = "ECOMAIL_RESPONSE_FORMAT";

/// How successful response bodies are handed back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResponseFormat {
    /// JSON, objects walked as ordered maps.
    #[default]
    JsonArray,
    /// JSON, objects read as attribute records.
    JsonObject,
    /// The raw body, never parsed.
    PlainText,
}

impl ResponseFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseFormat::JsonArray => "jsona",
            ResponseFormat::JsonObject => "jsono",
            ResponseFormat::PlainText => "plaintext",
        }
    }
}

impl FromStr for ResponseFormat {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "jsona" | "json_array" => Ok(ResponseFormat::JsonArray),
            "jsono" | "json_object" => Ok(ResponseFormat::JsonObject),
            "plaintext" | "plain_text" => Ok(ResponseFormat::PlainText),
            _ => Err(ApiError::Configuration(format!("unknown response format: {s}"))),
        }
    }
}

/// Everything a `Client` needs to talk to the API.
#[derive(Clone)]
pub struct ClientConfig {
    api_key: String,
    server: String,
    format: ResponseFormat,
    hook: Option<Arc<dyn RequestHook>>,
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            server: DEFAULT_SERVER.to_string(),
            format: ResponseFormat::default(),
            hook: None,
        }
    }

    /// Override the API origin. Used verbatim; a trailing slash produces a
    /// double slash in request URLs.
    pub fn with_server(mut self, server: impl Into<String>) -> Self {
        self.server = server.into();
        self
    }

    pub fn with_format(mut self, format: ResponseFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_hook<H: RequestHook + 'static>(mut self, hook: H) -> Self {
        self.hook = Some(Arc::new(hook));
        self
    }

    /// Read `ECOMAIL_API_KEY`, `ECOMAIL_SERVER` and
    /// `ECOMAIL_RESPONSE_FORMAT` from the process environment.
    pub fn from_env() -> Result<Self, ApiError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Like [`ClientConfig::from_env`], with a caller-supplied variable
    /// lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ApiError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(ENV_API_KEY)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| ApiError::Configuration(format!("{ENV_API_KEY} is not set")))?;

        let mut config = Self::new(api_key);
        if let Some(server) = lookup(ENV_SERVER).filter(|s| !s.is_empty()) {
            config = config.with_server(server);
        }
        if let Some(format) = lookup(ENV_RESPONSE_FORMAT).filter(|f| !f.is_empty()) {
            config = config.with_format(format.parse()?);
        }
        Ok(config)
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn server(&self) -> &str {
        &self.server
    }

    pub fn format(&self) -> ResponseFormat {
        self.format
    }

    pub fn hook(&self) -> Option<&dyn RequestHook> {
        self.hook.as_deref()
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"<redacted>")
            .field("server", &self.server)
            .field("format", &self.format)
            .field("hook", &self.hook.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use crate::hook::RequestContext;
    use crate::http::TransferOptions;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn defaults() {
        let config = ClientConfig::new("secret");
        assert_eq!(config.api_key(), "secret");
        assert_eq!(config.server(), DEFAULT_SERVER);
        assert_eq!(config.format(), ResponseFormat::JsonArray);
        assert!(config.hook().is_none());
    }

    #[test]
    fn builder_overrides() {
        let config = ClientConfig::new("secret")
            .with_server("http://localhost:3000/")
            .with_format(ResponseFormat::PlainText)
            .with_hook(|_: &mut TransferOptions, _: &RequestContext<'_>| {});
        assert_eq!(config.server(), "http://localhost:3000/");
        assert_eq!(config.format(), ResponseFormat::PlainText);
        assert!(config.hook().is_some());
    }

    #[test]
    fn debug_redacts_key() {
        let rendered = format!("{:?}", ClientConfig::new("super-secret"));
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn format_names() {
        assert_eq!("jsona".parse::<ResponseFormat>().unwrap(), ResponseFormat::JsonArray);
        assert_eq!("JSONO".parse::<ResponseFormat>().unwrap(), ResponseFormat::JsonObject);
        assert_eq!("plaintext".parse::<ResponseFormat>().unwrap(), ResponseFormat::PlainText);
        assert!(matches!(
            "xml".parse::<ResponseFormat>(),
            Err(ApiError::Configuration(_))
        ));
        assert_eq!(ResponseFormat::JsonObject.as_str(), "jsono");
    }

    #[test]
    fn from_lookup_reads_all_variables() {
        let config = ClientConfig::from_lookup(lookup(&[
            (ENV_API_KEY, "k"),
            (ENV_SERVER, "http://127.0.0.1:9"),
            (ENV_RESPONSE_FORMAT, "jsono"),
        ]))
        .unwrap();
        assert_eq!(config.api_key(), "k");
        assert_eq!(config.server(), "http://127.0.0.1:9");
        assert_eq!(config.format(), ResponseFormat::JsonObject);
    }

    #[test]
    fn from_lookup_requires_key() {
        let err = ClientConfig::from_lookup(lookup(&[(ENV_SERVER, "http://x")])).unwrap_err();
        assert!(matches!(err, ApiError::Configuration(ref m) if m.contains(ENV_API_KEY)));
    }

    #[test]
    fn from_lookup_keeps_defaults() {
        let config = ClientConfig::from_lookup(lookup(&[(ENV_API_KEY, "k")])).unwrap();
        assert_eq!(config.server(), DEFAULT_SERVER);
        assert_eq!(config.format(), ResponseFormat::JsonArray);
    }
}
