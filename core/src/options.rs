//! Client-scoped and call-scoped configuration.
//!
//! # Design
//! `ClientOptions` is assembled once through `ClientOptionsBuilder`; each
//! builder method sets one field and later calls win. After `build()` the
//! options are read-only and can be shared between threads. `CallOptions`
//! is built fresh for every request and never touches the client options.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Deserialize;

use crate::decoder::{Decoder, DecoderRegistry};
use crate::http::Headers;
use crate::transport::{Transport, UreqTransport};

/// Configuration for one remote service.
#[derive(Clone)]
pub struct ClientOptions {
    base_url: String,
    headers: Headers,
    debug: bool,
    basic_auth: Option<String>,
    transport: Arc<dyn Transport>,
    decoders: DecoderRegistry,
}

impl ClientOptions {
    /// Options with defaults for everything but the base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::builder(base_url).build()
    }

    pub fn builder(base_url: impl Into<String>) -> ClientOptionsBuilder {
        ClientOptionsBuilder::new(base_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    /// Base64 of `username:password`, without the `Basic ` prefix.
    pub fn basic_auth(&self) -> Option<&str> {
        self.basic_auth.as_deref()
    }

    pub fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    pub fn decoders(&self) -> &DecoderRegistry {
        &self.decoders
    }
}

impl fmt::Debug for ClientOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientOptions")
            .field("base_url", &self.base_url)
            .field("headers", &crate::redact::redact_headers(&self.headers))
            .field("debug", &self.debug)
            .field("basic_auth", &self.basic_auth.as_ref().map(|_| crate::redact::REDACTED))
            .field("decoders", &self.decoders)
            .finish_non_exhaustive()
    }
}

/// Builder for [`ClientOptions`].
pub struct ClientOptionsBuilder {
    base_url: String,
    headers: Headers,
    debug: bool,
    basic_auth: Option<String>,
    transport: Option<Arc<dyn Transport>>,
    decoders: Vec<(String, Decoder)>,
}

impl ClientOptionsBuilder {
    fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            headers: Headers::new(),
            debug: false,
            basic_auth: None,
            transport: None,
            decoders: Vec::new(),
        }
    }

    /// Add or replace one default header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Replace all default headers.
    pub fn headers(mut self, headers: Headers) -> Self {
        self.headers = headers;
        self
    }

    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn basic_auth(mut self, username: &str, password: &str) -> Self {
        self.basic_auth = Some(STANDARD.encode(format!("{username}:{password}")));
        self
    }

    pub fn transport(self, transport: impl Transport + 'static) -> Self {
        self.shared_transport(Arc::new(transport))
    }

    pub fn shared_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Decode `content_type` with `decoder`, taking precedence over the
    /// built-in decoder for the same type.
    pub fn decoder(mut self, content_type: impl Into<String>, decoder: Decoder) -> Self {
        self.decoders.push((content_type.into(), decoder));
        self
    }

    pub fn build(self) -> ClientOptions {
        let mut decoders = DecoderRegistry::builtin();
        for (content_type, decoder) in self.decoders {
            decoders.register(&content_type, decoder);
        }
        ClientOptions {
            base_url: self.base_url,
            headers: self.headers,
            debug: self.debug,
            basic_auth: self.basic_auth,
            transport: self
                .transport
                .unwrap_or_else(|| Arc::new(UreqTransport::default())),
            decoders,
        }
    }
}

/// Serializable client settings, e.g. loaded from a JSON config file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientConfig {
    pub base_url: String,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default)]
    pub debug: bool,
    #[serde(default)]
    pub basic_auth: Option<BasicAuth>,
}

#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct BasicAuth {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicAuth")
            .field("username", &self.username)
            .field("password", &crate::redact::REDACTED)
            .finish()
    }
}

impl ClientConfig {
    /// Builder seeded from these settings; transport and decoders can still
    /// be attached before `build()`.
    pub fn into_builder(self) -> ClientOptionsBuilder {
        let mut builder = ClientOptions::builder(self.base_url)
            .headers(self.headers)
            .debug(self.debug);
        if let Some(auth) = self.basic_auth {
            builder = builder.basic_auth(&auth.username, &auth.password);
        }
        builder
    }
}

/// Per-request configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallOptions {
    /// Log this request even when the client has debug off. Cannot turn
    /// client-level debug off.
    pub debug: bool,
    pub headers: Headers,
    pub query: BTreeMap<String, String>,
}

impl CallOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_headers(mut self, headers: Headers) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    pub fn with_query_params(mut self, query: BTreeMap<String, String>) -> Self {
        self.query = query;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}
