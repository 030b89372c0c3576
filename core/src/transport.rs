//! The pluggable HTTP transport.
//!
//! # Design
//! The pipeline only needs one capability from the network: turn an
//! `HttpRequest` into a `TransportResponse` or an error. `UreqTransport` is
//! the default; `MockTransport` answers with a canned response so the
//! pipeline can be exercised without a server.

use std::io::{self, Read};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use ureq::typestate::WithBody;
use ureq::{Agent, RequestBuilder, SendBody};

use crate::error::BoxError;
use crate::http::{Headers, HttpMethod, HttpRequest, TransportResponse};

/// Executes one HTTP exchange.
///
/// Implementations must return non-2xx responses as `Ok`; status handling
/// belongs to the response pipeline.
pub trait Transport: Send + Sync {
    fn execute(&self, request: HttpRequest) -> Result<TransportResponse, BoxError>;
}

/// Blocking transport backed by a `ureq::Agent`.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }

    /// Transport whose whole exchange is bounded by `timeout`.
    pub fn with_timeout(timeout: Duration) -> Self {
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(timeout))
            .build()
            .new_agent();
        Self { agent }
    }

    /// Use a preconfigured agent. It must have `http_status_as_error`
    /// disabled, otherwise error statuses surface as transport failures.
    pub fn from_agent(agent: Agent) -> Self {
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: HttpRequest) -> Result<TransportResponse, BoxError> {
        let HttpRequest {
            method,
            url,
            headers,
            body,
        } = request;

        let payload = body.map(|body| SendBody::from_owned_reader(body.into_reader()));

        let response = match method {
            HttpMethod::Get => with_headers(self.agent.get(&url), &headers).call(),
            HttpMethod::Delete => with_headers(self.agent.delete(&url), &headers).call(),
            HttpMethod::Post => send(with_headers(self.agent.post(&url), &headers), payload),
            HttpMethod::Put => send(with_headers(self.agent.put(&url), &headers), payload),
            HttpMethod::Patch => send(with_headers(self.agent.patch(&url), &headers), payload),
        }?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
                (name.as_str().to_string(), value)
            })
            .collect();
        let body = response.into_body().into_reader();

        Ok(TransportResponse::new(status, headers, body))
    }
}

fn with_headers<B>(mut builder: RequestBuilder<B>, headers: &Headers) -> RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

fn send(
    builder: RequestBuilder<WithBody>,
    payload: Option<SendBody<'static>>,
) -> Result<ureq::http::Response<ureq::Body>, ureq::Error> {
    match payload {
        Some(body) => builder.send(body),
        None => builder.send_empty(),
    }
}

/// A request as seen by [`MockTransport`], with the body already drained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Headers,
    pub body: Option<Vec<u8>>,
}

#[derive(Debug, Clone)]
enum MockReply {
    Response {
        status: u16,
        headers: Vec<(String, String)>,
        body: Vec<u8>,
        broken_body: bool,
    },
    Failure(String),
}

/// Test double answering every request with the same canned reply.
///
/// Clones share the list of recorded requests, so a clone handed to
/// `ClientOptions` can still be inspected by the test.
#[derive(Debug, Clone)]
pub struct MockTransport {
    reply: MockReply,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockTransport {
    /// Respond with `status`, no headers and an empty body.
    pub fn respond(status: u16) -> Self {
        Self::with_reply(MockReply::Response {
            status,
            headers: Vec::new(),
            body: Vec::new(),
            broken_body: false,
        })
    }

    /// Fail every request with an I/O error carrying `message`.
    pub fn fail(message: impl Into<String>) -> Self {
        Self::with_reply(MockReply::Failure(message.into()))
    }

    fn with_reply(reply: MockReply) -> Self {
        Self {
            reply,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        if let MockReply::Response { headers, .. } = &mut self.reply {
            headers.push((name.into(), value.into()));
        }
        self
    }

    pub fn content_type(self, content_type: impl Into<String>) -> Self {
        self.header("Content-Type", content_type)
    }

    pub fn body(mut self, bytes: impl Into<Vec<u8>>) -> Self {
        if let MockReply::Response { body, .. } = &mut self.reply {
            *body = bytes.into();
        }
        self
    }

    /// Make the response body stream fail after yielding the canned bytes.
    pub fn broken_body(mut self) -> Self {
        if let MockReply::Response { broken_body, .. } = &mut self.reply {
            *broken_body = true;
        }
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.requests().pop()
    }
}

impl Transport for MockTransport {
    fn execute(&self, request: HttpRequest) -> Result<TransportResponse, BoxError> {
        let body = match request.body {
            Some(body) => {
                let mut bytes = Vec::new();
                body.into_reader().read_to_end(&mut bytes)?;
                Some(bytes)
            }
            None => None,
        };
        self.requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(RecordedRequest {
                method: request.method,
                url: request.url,
                headers: request.headers,
                body,
            });

        match &self.reply {
            MockReply::Failure(message) => Err(io::Error::other(message.clone()).into()),
            MockReply::Response {
                status,
                headers,
                body,
                broken_body,
            } => {
                let reader = io::Cursor::new(body.clone());
                let response = if *broken_body {
                    TransportResponse::new(*status, headers.clone(), reader.chain(BrokenStream))
                } else {
                    TransportResponse::new(*status, headers.clone(), reader)
                };
                Ok(response)
            }
        }
    }
}

struct BrokenStream;

impl Read for BrokenStream {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::new(
            io::ErrorKind::ConnectionReset,
            "connection reset while reading body",
        ))
    }
}
