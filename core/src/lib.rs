//! Typed REST calls over a pluggable HTTP transport.
//!
//! # Overview
//! `get`, `post`, `put`, `patch` and `delete` build a request from
//! `ClientOptions` and `CallOptions`, execute it through the client's
//! `Transport`, and decode the body into the caller's type according to the
//! response `Content-Type`.
//!
//! ```no_run
//! use rester::{CallOptions, ClientOptions};
//!
//! #[derive(Debug, Default, serde::Deserialize)]
//! struct User {
//!     name: String,
//! }
//!
//! let client = ClientOptions::builder("https://api.example.com")
//!     .header("Accept", "application/json")
//!     .build();
//! let reply = rester::get::<User>(&client, "/users/1", CallOptions::new().with_query("full", "1"));
//! match reply.error {
//!     None => println!("hello {}", reply.value.name),
//!     Some(err) => eprintln!("{} failed: {err}", reply.http.status),
//! }
//! ```
//!
//! # Design
//! - Options are immutable once built and can be shared across threads.
//! - Each client carries its own decoder registry; built-ins cover JSON,
//!   XML and plain text, and custom decoders override them per MIME type.
//! - The raw `HttpResult` is returned on every call, including failures.

pub mod client;
pub mod decoder;
pub mod error;
pub mod http;
pub mod options;
pub mod redact;
pub mod request;
pub mod response;
pub mod transport;

pub use client::{delete, get, patch, post, put, Reply};
pub use decoder::{normalize_content_type, Decoder, DecoderRegistry};
pub use error::{BoxError, Error};
pub use http::{Headers, HttpMethod, HttpRequest, RequestBody, TransportResponse};
pub use options::{BasicAuth, CallOptions, ClientConfig, ClientOptions, ClientOptionsBuilder};
pub use redact::{redact_headers, REDACTED};
pub use response::HttpResult;
pub use transport::{MockTransport, RecordedRequest, Transport, UreqTransport};
