//! Masking of sensitive header values for debug logs.

use crate::http::Headers;

/// Replacement value for masked headers.
pub const REDACTED: &str = "REDACTED";

/// Lowercase substrings that mark a header name as sensitive.
const SENSITIVE_TOKENS: [&str; 9] = [
    "authorization",
    "auth",
    "cookie",
    "key",
    "token",
    "secret",
    "password",
    "api-key",
    "api-token",
];

/// Whether `name` contains one of the sensitive tokens, ignoring case.
pub fn is_sensitive(name: &str) -> bool {
    let name = name.to_ascii_lowercase();
    SENSITIVE_TOKENS.iter().any(|token| name.contains(token))
}

/// Copy of `headers` with every sensitive value replaced by [`REDACTED`].
///
/// Only meant for logging; the outgoing request keeps the real values.
pub fn redact_headers(headers: &Headers) -> Headers {
    headers
        .iter()
        .map(|(name, value)| {
            let value = if is_sensitive(name) {
                REDACTED.to_string()
            } else {
                value.clone()
            };
            (name.clone(), value)
        })
        .collect()
}
