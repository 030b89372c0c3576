//! Content-type keyed decoders.
//!
//! # Design
//! Every `ClientOptions` owns its own `DecoderRegistry`: the built-ins are
//! inserted first and client overrides are registered on top once, at
//! construction, so the registry is never mutated while requests run.
//!
//! Built-in decoders deserialize straight into the caller's target type.
//! Custom decoders cannot be generic over the target, so they produce a
//! `serde_json::Value` which is then deserialized into the target.

use std::any::{self, Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::error::{BoxError, Error};

/// Signature of a user-supplied decoder.
pub type DecodeFn = dyn Fn(&[u8]) -> Result<serde_json::Value, BoxError> + Send + Sync;

/// A body decoder for one family of content types.
#[derive(Clone)]
pub enum Decoder {
    /// `serde_json` into the target.
    Json,
    /// `quick-xml` into the target.
    Xml,
    /// Raw UTF-8 text; the target must be `String`.
    Text,
    Custom(Arc<DecodeFn>),
}

impl Decoder {
    pub fn custom<F>(decode: F) -> Self
    where
        F: Fn(&[u8]) -> Result<serde_json::Value, BoxError> + Send + Sync + 'static,
    {
        Decoder::Custom(Arc::new(decode))
    }

    pub(crate) fn decode<T>(&self, content_type: &str, body: &[u8]) -> Result<T, Error>
    where
        T: DeserializeOwned + 'static,
    {
        match self {
            Decoder::Json => {
                serde_json::from_slice(body).map_err(|e| Error::decode(content_type, e))
            }
            Decoder::Xml => {
                quick_xml::de::from_reader(body).map_err(|e| Error::decode(content_type, e))
            }
            Decoder::Text => decode_text(content_type, body),
            Decoder::Custom(decode) => {
                let value = decode(body).map_err(|e| Error::decode(content_type, e))?;
                serde_json::from_value(value).map_err(|e| Error::decode(content_type, e))
            }
        }
    }
}

impl fmt::Debug for Decoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decoder::Json => f.write_str("Json"),
            Decoder::Xml => f.write_str("Xml"),
            Decoder::Text => f.write_str("Text"),
            Decoder::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

fn decode_text<T: 'static>(content_type: &str, body: &[u8]) -> Result<T, Error> {
    let mismatch = || Error::TypeMismatch {
        content_type: content_type.to_string(),
        target: any::type_name::<T>(),
    };
    if TypeId::of::<T>() != TypeId::of::<String>() {
        return Err(mismatch());
    }
    let text = String::from_utf8(body.to_vec()).map_err(|e| Error::decode(content_type, e))?;
    let text: Box<dyn Any> = Box::new(text);
    text.downcast::<T>().map(|text| *text).map_err(|_| mismatch())
}

/// Strip any `;` parameters and surrounding whitespace from a content type.
///
/// `"application/json; charset=utf-8"` becomes `"application/json"`.
pub fn normalize_content_type(content_type: &str) -> &str {
    content_type
        .split_once(';')
        .map_or(content_type, |(mime, _)| mime)
        .trim()
}

/// Normalized MIME type to decoder.
#[derive(Clone)]
pub struct DecoderRegistry {
    decoders: HashMap<String, Decoder>,
}

impl DecoderRegistry {
    /// Registry with no decoders at all.
    pub fn empty() -> Self {
        Self {
            decoders: HashMap::new(),
        }
    }

    /// JSON, XML and plain-text decoders.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry.register("application/json", Decoder::Json);
        registry.register("application/problem+json", Decoder::Json);
        registry.register("application/xml", Decoder::Xml);
        registry.register("text/xml", Decoder::Xml);
        registry.register("text/plain", Decoder::Text);
        registry
    }

    /// Register `decoder` for `content_type`, replacing any previous entry.
    /// The key is normalized first.
    pub fn register(&mut self, content_type: &str, decoder: Decoder) {
        self.decoders
            .insert(normalize_content_type(content_type).to_string(), decoder);
    }

    /// Decoder for a raw `Content-Type` value.
    pub fn lookup(&self, content_type: &str) -> Option<&Decoder> {
        self.decoders.get(normalize_content_type(content_type))
    }
}

impl Default for DecoderRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl fmt::Debug for DecoderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.decoders.iter()).finish()
    }
}
