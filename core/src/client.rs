//! The five verb functions and their `Reply`.
//!
//! # Design
//! Every verb runs the same pipeline: build the request, hand it to the
//! client's transport, read and decode the body, then validate the status.
//! A failure in one stage skips the later ones. Whatever `HttpResult` was
//! populated so far is returned with the error, and a non-2xx status is
//! reported alongside the decoded value rather than instead of it.

use serde::de::DeserializeOwned;
use tracing::trace;

use crate::error::Error;
use crate::http::{HttpMethod, RequestBody, TransportResponse};
use crate::options::{CallOptions, ClientOptions};
use crate::request::build_request;
use crate::response::{check_status, read_result, HttpResult};

/// Outcome of one verb call: the decoded value, the raw exchange and the
/// error, if any.
///
/// `value` is `T::default()` unless decoding succeeded. On a
/// `NonSuccessStatus` error it still holds whatever the error body decoded
/// to.
#[derive(Debug)]
#[must_use]
pub struct Reply<T> {
    pub value: T,
    pub http: HttpResult,
    pub error: Option<Error>,
}

impl<T> Reply<T> {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Drop the raw exchange and keep only the value or the error.
    pub fn into_result(self) -> Result<T, Error> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.value),
        }
    }

    pub fn into_parts(self) -> (T, HttpResult, Option<Error>) {
        (self.value, self.http, self.error)
    }
}

impl<T: Default> Reply<T> {
    fn failed(http: HttpResult, error: Error) -> Self {
        Self {
            value: T::default(),
            http,
            error: Some(error),
        }
    }
}

pub fn get<T>(client: &ClientOptions, path: &str, call: CallOptions) -> Reply<T>
where
    T: DeserializeOwned + Default + 'static,
{
    execute(client, HttpMethod::Get, path, None, call)
}

pub fn post<T>(
    client: &ClientOptions,
    path: &str,
    body: impl Into<RequestBody>,
    call: CallOptions,
) -> Reply<T>
where
    T: DeserializeOwned + Default + 'static,
{
    execute(client, HttpMethod::Post, path, Some(body.into()), call)
}

pub fn put<T>(
    client: &ClientOptions,
    path: &str,
    body: impl Into<RequestBody>,
    call: CallOptions,
) -> Reply<T>
where
    T: DeserializeOwned + Default + 'static,
{
    execute(client, HttpMethod::Put, path, Some(body.into()), call)
}

pub fn patch<T>(
    client: &ClientOptions,
    path: &str,
    body: impl Into<RequestBody>,
    call: CallOptions,
) -> Reply<T>
where
    T: DeserializeOwned + Default + 'static,
{
    execute(client, HttpMethod::Patch, path, Some(body.into()), call)
}

pub fn delete<T>(client: &ClientOptions, path: &str, call: CallOptions) -> Reply<T>
where
    T: DeserializeOwned + Default + 'static,
{
    execute(client, HttpMethod::Delete, path, None, call)
}

fn execute<T>(
    client: &ClientOptions,
    method: HttpMethod,
    path: &str,
    body: Option<RequestBody>,
    call: CallOptions,
) -> Reply<T>
where
    T: DeserializeOwned + Default + 'static,
{
    let request = match build_request(client, method, path, body, &call) {
        Ok(request) => request,
        Err(error) => return Reply::failed(HttpResult::default(), error),
    };

    let response = match client.transport().execute(request) {
        Ok(response) => response,
        Err(source) => return Reply::failed(HttpResult::default(), Error::Transport(source)),
    };

    let mut http = HttpResult::from_response(&response);
    trace!(
        method = %method,
        status = http.status,
        content_type = %http.content_type,
        "received response"
    );

    // The body stream is consumed here and dropped before returning.
    let TransportResponse { body, .. } = response;
    let value = match read_result(body, client.decoders(), &mut http) {
        Ok(value) => value,
        Err(error) => return Reply::failed(http, error),
    };

    Reply {
        value,
        error: check_status(http.status).err(),
        http,
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use serde::Deserialize;

    use super::*;
    use crate::decoder::Decoder;
    use crate::transport::MockTransport;

    #[derive(Debug, Default, Deserialize, PartialEq)]
    struct TestBody {
        name: String,
    }

    fn client(mock: &MockTransport) -> ClientOptions {
        ClientOptions::builder("http://localhost:3000")
            .transport(mock.clone())
            .build()
    }

    #[test]
    fn get_json_populates_value_and_http_result() {
        let mock = MockTransport::respond(200)
            .content_type("application/json")
            .body(r#"{"name":"Adam"}"#);
        let call = CallOptions::new()
            .with_header("X-Test-Header", "test-value")
            .with_query("param1", "value1");

        let reply: Reply<TestBody> = get(&client(&mock), "/test", call);

        assert!(reply.is_success(), "{:?}", reply.error);
        assert_eq!(reply.value.name, "Adam");
        assert_eq!(reply.http.status, 200);
        assert_eq!(reply.http.body, br#"{"name":"Adam"}"#);

        let request = mock.last_request().unwrap();
        assert_eq!(request.method, HttpMethod::Get);
        assert_eq!(request.url, "http://localhost:3000/test?param1=value1");
        assert_eq!(request.headers["X-Test-Header"], "test-value");
        assert!(request.body.is_none());
    }

    #[test]
    fn get_text_into_string() {
        let mock = MockTransport::respond(200)
            .content_type("text/plain")
            .body("Hello World");
        let reply: Reply<String> = get(&client(&mock), "/test", CallOptions::new());
        assert_eq!(reply.into_result().unwrap(), "Hello World");
    }

    #[test]
    fn get_text_into_struct_is_type_mismatch() {
        let mock = MockTransport::respond(200)
            .content_type("text/plain")
            .body("Hello World");
        let reply: Reply<TestBody> = get(&client(&mock), "/test", CallOptions::new());
        assert!(matches!(reply.error, Some(Error::TypeMismatch { .. })));
        assert_eq!(reply.value, TestBody::default());
        assert_eq!(reply.http.body, b"Hello World");
    }

    #[test]
    fn server_error_with_empty_text_body() {
        let mock = MockTransport::respond(500).content_type("text/plain");
        let reply: Reply<String> = get(&client(&mock), "/test", CallOptions::new());
        assert_eq!(reply.error.as_ref().and_then(Error::status), Some(500));
        assert_eq!(reply.http.status, 500);
        assert_eq!(reply.value, "");
    }

    #[test]
    fn error_status_still_returns_decoded_problem() {
        let mock = MockTransport::respond(404)
            .content_type("application/problem+json")
            .body(r#"{"name":"missing"}"#);
        let (value, http, error) =
            get::<TestBody>(&client(&mock), "/test", CallOptions::new()).into_parts();
        assert_eq!(value.name, "missing");
        assert_eq!(http.status, 404);
        assert!(matches!(error, Some(Error::NonSuccessStatus(404))));
    }

    #[test]
    fn decode_error_wins_over_status() {
        let mock = MockTransport::respond(502)
            .content_type("application/json")
            .body("<html>bad gateway</html>");
        let reply: Reply<TestBody> = get(&client(&mock), "/test", CallOptions::new());
        assert!(matches!(reply.error, Some(Error::Decode { .. })));
        assert_eq!(reply.http.status, 502);
    }

    #[test]
    fn post_sends_body_and_decodes_echo() {
        let mock = MockTransport::respond(201)
            .content_type("application/json")
            .body(r#"{"name":"Adam"}"#);
        let reply: Reply<TestBody> = post(
            &client(&mock),
            "/test",
            r#"{"name":"Adam"}"#,
            CallOptions::new().with_header("Content-Type", "application/json"),
        );
        assert!(reply.is_success());
        assert_eq!(reply.value.name, "Adam");
        assert_eq!(reply.http.status, 201);

        let request = mock.last_request().unwrap();
        assert_eq!(request.method, HttpMethod::Post);
        assert_eq!(request.body.as_deref(), Some(&br#"{"name":"Adam"}"#[..]));
    }

    #[test]
    fn put_and_patch_use_their_methods() {
        let mock = MockTransport::respond(200)
            .content_type("application/xml")
            .body("<TestBody><name>Adam</name></TestBody>");
        let client = client(&mock);

        let reply: Reply<TestBody> = put(&client, "/a", RequestBody::empty(), CallOptions::new());
        assert_eq!(reply.value.name, "Adam");
        let reply: Reply<TestBody> = patch(
            &client,
            "/b",
            RequestBody::from_reader(io::Cursor::new(vec![1, 2, 3])),
            CallOptions::new(),
        );
        assert_eq!(reply.value.name, "Adam");

        let requests = mock.requests();
        assert_eq!(requests[0].method, HttpMethod::Put);
        assert_eq!(requests[0].body.as_deref(), Some(&[][..]));
        assert_eq!(requests[1].method, HttpMethod::Patch);
        assert_eq!(requests[1].body.as_deref(), Some(&[1u8, 2, 3][..]));
    }

    #[test]
    fn delete_with_no_content() {
        let mock = MockTransport::respond(204);
        let reply: Reply<TestBody> = delete(&client(&mock), "/items/1", CallOptions::new());
        assert!(reply.is_success());
        assert_eq!(reply.value, TestBody::default());
        assert_eq!(reply.http.status, 204);
        assert_eq!(mock.last_request().unwrap().method, HttpMethod::Delete);
    }

    #[test]
    fn transport_failure_leaves_zero_http_result() {
        let mock = MockTransport::fail("connection refused");
        let reply: Reply<TestBody> = get(&client(&mock), "/test", CallOptions::new());
        assert!(matches!(reply.error, Some(Error::Transport(_))));
        assert_eq!(reply.http, HttpResult::default());
    }

    #[test]
    fn broken_body_is_body_read_error() {
        let mock = MockTransport::respond(200)
            .content_type("application/json")
            .body("{")
            .broken_body();
        let reply: Reply<TestBody> = get(&client(&mock), "/test", CallOptions::new());
        assert!(matches!(reply.error, Some(Error::BodyRead(_))));
        assert_eq!(reply.http.status, 200);
        assert_eq!(reply.http.content_type, "application/json");
    }

    #[test]
    fn construction_error_never_reaches_transport() {
        let mock = MockTransport::respond(200);
        let client = ClientOptions::builder("not a url")
            .transport(mock.clone())
            .build();
        let reply: Reply<TestBody> = get(&client, "/test", CallOptions::new());
        assert!(matches!(reply.error, Some(Error::RequestConstruction { .. })));
        assert!(mock.requests().is_empty());
    }

    #[test]
    fn custom_decoder_replaces_builtin() {
        let mock = MockTransport::respond(200)
            .content_type("text/plain; charset=utf-8")
            .body("Adam");
        let client = ClientOptions::builder("http://localhost")
            .transport(mock)
            .decoder(
                "text/plain",
                Decoder::custom(|body| {
                    Ok(serde_json::json!({ "name": String::from_utf8_lossy(body) }))
                }),
            )
            .build();
        let reply: Reply<TestBody> = get(&client, "/name", CallOptions::new());
        assert_eq!(reply.into_result().unwrap().name, "Adam");
    }

    #[test]
    fn unsupported_content_type_names_the_type() {
        let mock = MockTransport::respond(200)
            .content_type("text/csv")
            .body("name\nAdam");
        let reply: Reply<TestBody> = get(&client(&mock), "/test", CallOptions::new());
        let err = reply.into_result().unwrap_err();
        assert_eq!(err.to_string(), "unsupported content type: text/csv");
    }

    #[test]
    fn call_options_do_not_leak_between_calls() {
        let mock = MockTransport::respond(204);
        let client = client(&mock);
        let _: Reply<TestBody> = get(&client, "/a", CallOptions::new().with_header("X-Once", "1"));
        let _: Reply<TestBody> = get(&client, "/b", CallOptions::new());

        let requests = mock.requests();
        assert!(requests[0].headers.contains_key("X-Once"));
        assert!(!requests[1].headers.contains_key("X-Once"));
        assert!(client.headers().is_empty());
    }
}
