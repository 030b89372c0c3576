//! Turns client and call options into an `HttpRequest`.

use std::collections::BTreeMap;

use tracing::debug;

use crate::error::{BoxError, Error};
use crate::http::{Headers, HttpMethod, HttpRequest, RequestBody};
use crate::options::{CallOptions, ClientOptions};
use crate::redact::redact_headers;

pub(crate) fn build_request(
    client: &ClientOptions,
    method: HttpMethod,
    path: &str,
    body: Option<RequestBody>,
    call: &CallOptions,
) -> Result<HttpRequest, Error> {
    let url = full_url(client.base_url(), path, &call.query).map_err(|e| {
        Error::RequestConstruction {
            url: format!("{}{path}", client.base_url()),
            source: e.into(),
        }
    })?;
    validate_url(&url).map_err(|source| Error::RequestConstruction {
        url: url.clone(),
        source,
    })?;

    let headers = merge_headers(client, &call.headers);
    validate_headers(&headers).map_err(|source| Error::RequestConstruction {
        url: url.clone(),
        source,
    })?;

    if call.debug || client.debug() {
        debug!(
            method = %method,
            url = %url,
            headers = ?redact_headers(&headers),
            "sending request"
        );
    }

    Ok(HttpRequest {
        method,
        url,
        headers,
        body,
    })
}

/// `base_url + path`, plus `?k=v&...` when `query` is non-empty. Keys and
/// values are form-encoded independently.
pub fn full_url(
    base_url: &str,
    path: &str,
    query: &BTreeMap<String, String>,
) -> Result<String, serde_urlencoded::ser::Error> {
    let mut url = format!("{base_url}{path}");
    if !query.is_empty() {
        url.push('?');
        url.push_str(&serde_urlencoded::to_string(query)?);
    }
    Ok(url)
}

/// Basic auth first, then client headers, then call headers. Later writes
/// replace earlier ones with the exact same key.
pub fn merge_headers(client: &ClientOptions, call: &Headers) -> Headers {
    let mut headers = Headers::new();
    if let Some(credentials) = client.basic_auth() {
        headers.insert("Authorization".to_string(), format!("Basic {credentials}"));
    }
    for (name, value) in client.headers().iter().chain(call) {
        headers.insert(name.clone(), value.clone());
    }
    headers
}

fn validate_url(url: &str) -> Result<(), BoxError> {
    let uri: ::http::Uri = url.parse()?;
    if uri.scheme().is_none() {
        return Err("URL has no scheme".into());
    }
    if uri.authority().is_none() {
        return Err("URL has no host".into());
    }
    Ok(())
}

fn validate_headers(headers: &Headers) -> Result<(), BoxError> {
    for (name, value) in headers {
        ::http::HeaderName::from_bytes(name.as_bytes())?;
        ::http::HeaderValue::from_str(value)?;
    }
    Ok(())
}
