//! Reading, classifying and decoding responses.
//!
//! # Design
//! The raw exchange is captured in `HttpResult` before anything can fail,
//! and the body bytes are stored before any decode attempt, so callers can
//! always inspect what the server sent. Status validation is a separate
//! step that runs after decoding.

use std::io::Read;

use serde::de::DeserializeOwned;
use tracing::trace;

use crate::decoder::{normalize_content_type, DecoderRegistry};
use crate::error::Error;
use crate::http::{find_header, TransportResponse};

/// Raw outcome of one HTTP exchange.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpResult {
    /// `Content-Type` exactly as sent by the server; empty when absent.
    pub content_type: String,
    pub body: Vec<u8>,
    pub status: u16,
    pub headers: Vec<(String, String)>,
}

impl HttpResult {
    /// Status, headers and content type of `response`; the body is left
    /// empty until it has been read.
    pub(crate) fn from_response(response: &TransportResponse) -> Self {
        Self {
            content_type: response.header("Content-Type").unwrap_or_default().to_string(),
            body: Vec::new(),
            status: response.status,
            headers: response.headers.clone(),
        }
    }

    /// First value of the header `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    pub fn is_success(&self) -> bool {
        (200..=299).contains(&self.status)
    }
}

/// Drain `body` into `http.body`, then decode it according to
/// `http.content_type`.
///
/// No content type, or an empty body, yields `T::default()`.
pub(crate) fn read_result<T>(
    mut body: impl Read,
    decoders: &DecoderRegistry,
    http: &mut HttpResult,
) -> Result<T, Error>
where
    T: DeserializeOwned + Default + 'static,
{
    let mut bytes = Vec::new();
    body.read_to_end(&mut bytes).map_err(Error::BodyRead)?;
    http.body = bytes;

    let content_type = normalize_content_type(&http.content_type);
    if content_type.is_empty() {
        trace!(status = http.status, "no content type, skipping decode");
        return Ok(T::default());
    }
    if http.body.is_empty() {
        trace!(status = http.status, content_type, "empty body, skipping decode");
        return Ok(T::default());
    }

    match decoders.lookup(content_type) {
        Some(decoder) => decoder.decode(content_type, &http.body),
        None => Err(Error::UnsupportedContentType(content_type.to_string())),
    }
}

/// Any status outside 200..=299 is an error.
pub(crate) fn check_status(status: u16) -> Result<(), Error> {
    if (200..=299).contains(&status) {
        Ok(())
    } else {
        Err(Error::NonSuccessStatus(status))
    }
}
