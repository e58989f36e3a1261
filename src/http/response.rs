//! HTTP response building module
//!
//! Builders for every response the server emits. Builder failures never
//! panic: they are logged and replaced by a bare response.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::header::{ALLOW, CONTENT_TYPE};
use hyper::http::response::Builder;
use hyper::{Response, StatusCode};
use serde::Serialize;

pub const TEXT_PLAIN: &str = "text/plain; charset=utf-8";
pub const APPLICATION_JSON: &str = "application/json";

/// Methods accepted on the ingest path
pub const INGEST_ALLOW: &str = "POST, OPTIONS";
/// Methods accepted on the health path
pub const HEALTH_ALLOW: &str = "GET, HEAD";

/// Plain-text response with the given status
pub fn build_text_response(status: StatusCode, body: impl Into<Bytes>) -> Response<Full<Bytes>> {
    finish(
        Response::builder()
            .status(status)
            .header(CONTENT_TYPE, TEXT_PLAIN),
        body.into(),
    )
}

/// Serialize `body` as compact JSON
pub fn build_json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<Full<Bytes>> {
    match serde_json::to_vec(body) {
        Ok(json) => finish(
            Response::builder()
                .status(status)
                .header(CONTENT_TYPE, APPLICATION_JSON),
            Bytes::from(json),
        ),
        Err(e) => {
            crate::logger::log_error(&format!("Failed to serialize response: {e}"));
            build_text_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Server error: {e}"),
            )
        }
    }
}

/// Build health check response
pub fn build_health_response() -> Response<Full<Bytes>> {
    build_text_response(StatusCode::OK, "ok")
}

/// Build 404 Not Found response
pub fn build_404_response() -> Response<Full<Bytes>> {
    build_text_response(StatusCode::NOT_FOUND, "404 Not Found")
}

/// Build 405 Method Not Allowed response listing the `allow`ed methods
pub fn build_405_response(allow: &'static str) -> Response<Full<Bytes>> {
    finish(
        Response::builder()
            .status(StatusCode::METHOD_NOT_ALLOWED)
            .header(CONTENT_TYPE, TEXT_PLAIN)
            .header(ALLOW, allow),
        Bytes::from("405 Method Not Allowed"),
    )
}

/// Build 413 Payload Too Large response
pub fn build_413_response() -> Response<Full<Bytes>> {
    build_text_response(StatusCode::PAYLOAD_TOO_LARGE, "413 Payload Too Large")
}

/// Build OPTIONS response (preflight request)
pub fn build_options_response(enable_cors: bool) -> Response<Full<Bytes>> {
    let mut builder = Response::builder()
        .status(StatusCode::NO_CONTENT)
        .header(ALLOW, INGEST_ALLOW);

    if enable_cors {
        builder = builder
            .header("Access-Control-Allow-Origin", "*")
            .header("Access-Control-Allow-Methods", INGEST_ALLOW)
            .header("Access-Control-Allow-Headers", "Content-Type")
            .header("Access-Control-Max-Age", "86400");
    }

    finish(builder, Bytes::new())
}

fn finish(builder: Builder, body: Bytes) -> Response<Full<Bytes>> {
    let fallback = body.clone();
    builder.body(Full::new(body)).unwrap_or_else(|e| {
        crate::logger::log_error(&format!("Failed to build response: {e}"));
        Response::new(Full::new(fallback))
    })
}
