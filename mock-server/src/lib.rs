use std::collections::BTreeMap;

use axum::{
    body::Bytes,
    extract::{Path, Query},
    http::{header, HeaderMap, Method, StatusCode},
    routing::{any, delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

pub const XML_BODY: &str = "<TestBody><name>Adam</name></TestBody>";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TestBody {
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Problem {
    pub title: String,
    pub status: u16,
}

pub fn app() -> Router {
    Router::new()
        .route("/json", get(json))
        .route("/xml", get(xml))
        .route("/text", get(text))
        .route("/csv", get(csv))
        .route("/problem", get(problem))
        .route("/status/{code}", any(status))
        .route("/echo", post(echo).put(echo).patch(echo))
        .route("/headers", get(request_headers))
        .route("/query", get(query))
        .route("/items/{id}", delete(delete_item))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn json() -> Json<TestBody> {
    Json(TestBody {
        name: "Adam".to_string(),
    })
}

async fn xml() -> ([(header::HeaderName, &'static str); 1], &'static str) {
    ([(header::CONTENT_TYPE, "application/xml")], XML_BODY)
}

async fn text() -> ([(header::HeaderName, &'static str); 1], &'static str) {
    ([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], "Hello World")
}

async fn csv() -> ([(header::HeaderName, &'static str); 1], &'static str) {
    ([(header::CONTENT_TYPE, "text/csv")], "name\nAdam\n")
}

async fn problem() -> (StatusCode, [(header::HeaderName, &'static str); 1], Json<Problem>) {
    (
        StatusCode::UNPROCESSABLE_ENTITY,
        [(header::CONTENT_TYPE, "application/problem+json")],
        Json(Problem {
            title: "Invalid name".to_string(),
            status: 422,
        }),
    )
}

/// Empty `text/plain` response with the requested status.
async fn status(
    Path(code): Path<u16>,
) -> Result<(StatusCode, [(header::HeaderName, &'static str); 1]), StatusCode> {
    let status = StatusCode::from_u16(code).map_err(|_| StatusCode::BAD_REQUEST)?;
    Ok((status, [(header::CONTENT_TYPE, "text/plain")]))
}

/// Send the request body back with the request's content type; 201 for
/// POST, 200 otherwise.
async fn echo(
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, [(header::HeaderName, String); 1], Bytes) {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("application/json")
        .to_string();
    let status = if method == Method::POST {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    (status, [(header::CONTENT_TYPE, content_type)], body)
}

async fn request_headers(headers: HeaderMap) -> Json<BTreeMap<String, String>> {
    Json(
        headers
            .iter()
            .filter_map(|(name, value)| {
                Some((name.as_str().to_string(), value.to_str().ok()?.to_string()))
            })
            .collect(),
    )
}

async fn query(Query(params): Query<BTreeMap<String, String>>) -> Json<BTreeMap<String, String>> {
    Json(params)
}

async fn delete_item(Path(_id): Path<String>) -> StatusCode {
    StatusCode::NO_CONTENT
}
