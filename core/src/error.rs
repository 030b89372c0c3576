//! Error types for the REST pipeline.
//!
//! # Design
//! One variant per pipeline stage that can fail. Causes coming from the
//! transport, the body stream or a decoder are kept as `source()` so callers
//! can downcast to the concrete error. `NonSuccessStatus` is the only
//! variant produced after a body was decoded; see [`crate::Reply`].

use std::io;

use thiserror::Error;

/// Boxed error used for opaque causes from transports and decoders.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors returned by the verb functions.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The URL or one of the merged headers could not form a valid request.
    #[error("failed to create request for {url}: {source}")]
    RequestConstruction {
        url: String,
        #[source]
        source: BoxError,
    },

    /// The transport failed before a response was received.
    #[error("failed to execute request: {0}")]
    Transport(#[source] BoxError),

    /// The response body stream could not be read to the end.
    #[error("failed to read response body: {0}")]
    BodyRead(#[source] io::Error),

    /// A decoder was found but rejected the body.
    #[error("failed to decode {content_type} response: {source}")]
    Decode {
        content_type: String,
        #[source]
        source: BoxError,
    },

    /// Plain-text content asked to decode into something other than `String`.
    #[error("{content_type} content can only be decoded into String, not {target}")]
    TypeMismatch {
        content_type: String,
        target: &'static str,
    },

    /// A non-empty body arrived with a content type no decoder handles.
    #[error("unsupported content type: {0}")]
    UnsupportedContentType(String),

    /// The server answered outside the 200..=299 range.
    #[error("received non-success HTTP status code: {0}")]
    NonSuccessStatus(u16),
}

impl Error {
    pub(crate) fn decode(content_type: &str, source: impl Into<BoxError>) -> Self {
        Error::Decode {
            content_type: content_type.to_string(),
            source: source.into(),
        }
    }

    /// Status code carried by `NonSuccessStatus`.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::NonSuccessStatus(status) => Some(*status),
            _ => None,
        }
    }
}
