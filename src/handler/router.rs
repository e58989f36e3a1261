//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: route matching, method and body
//! size validation, body collection, and mapping ingestion outcomes to
//! responses.

use crate::config::AppState;
use crate::http;
use crate::ingest::{self, IngestError, IngestRequest, IngestSummary};
use crate::logger::{self, AccessLogEntry};
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::header::{HeaderValue, CONTENT_LENGTH, CONTENT_TYPE, SERVER, USER_AGENT};
use hyper::{Method, Request, Response, StatusCode, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    let started = Instant::now();
    let logging = &state.config.logging;
    let declared = declared_length(&req);

    let entry = logging.access_log.then(|| {
        let mut entry = AccessLogEntry::new(
            peer_addr.ip().to_string(),
            req.method().as_str(),
            req.uri().path(),
        );
        entry.http_version = version_str(req.version()).to_string();
        entry.content_type = header_string(&req, CONTENT_TYPE.as_str());
        entry.user_agent = header_string(&req, USER_AGENT.as_str());
        entry.request_bytes = declared;
        entry
    });

    let mut response = route_request(req, &state, declared).await;

    if let Ok(server) = HeaderValue::from_str(&state.config.http.server_name) {
        response.headers_mut().insert(SERVER, server);
    }

    if let Some(mut entry) = entry {
        entry.status = response.status().as_u16();
        entry.body_bytes = response
            .body()
            .size_hint()
            .exact()
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(0);
        entry.elapsed = started.elapsed();
        logger::log_access(&entry, &logging.access_log_format);
    }

    Ok(response)
}

/// Route request based on path and method
///
/// `declared` is the parsed Content-Length, if the request carried a usable one.
async fn route_request<B>(
    req: Request<B>,
    state: &AppState,
    declared: Option<u64>,
) -> Response<Full<Bytes>>
where
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    let routes = &state.config.routes;
    let path = req.uri().path();

    // 1. Liveness probe
    if path == routes.health_path {
        return match *req.method() {
            Method::GET | Method::HEAD => http::build_health_response(),
            _ => http::build_405_response(http::HEALTH_ALLOW),
        };
    }

    // 2. Everything except the ingest path is unknown
    if path != routes.ingest_path {
        return http::build_404_response();
    }

    // 3. Check HTTP method
    match *req.method() {
        Method::POST => {}
        Method::OPTIONS => return http::build_options_response(state.config.http.enable_cors),
        ref method => {
            logger::log_warning(&format!("Method not allowed: {method}"));
            return http::build_405_response(http::INGEST_ALLOW);
        }
    }

    // 4. Check declared body size before reading anything
    let max_body_size = state.config.http.max_body_size;
    if let Some(resp) = check_body_size(declared, max_body_size) {
        return resp;
    }

    // 5. Collect the body and ingest it
    let content_type = header_string(&req, CONTENT_TYPE.as_str()).unwrap_or_default();
    let body = match read_body(req.into_body(), max_body_size).await {
        Ok(body) => body,
        Err(resp) => return resp,
    };

    outcome_response(ingest::ingest(IngestRequest::new(content_type, body)).await)
}

/// Validate the declared Content-Length and return 413 if exceeded
fn check_body_size(declared: Option<u64>, max_body_size: u64) -> Option<Response<Full<Bytes>>> {
    let size = declared?;
    if size > max_body_size {
        logger::log_warning(&format!(
            "Request body too large: {size} bytes (max: {max_body_size})"
        ));
        return Some(http::build_413_response());
    }
    None
}

/// Collect the whole body, enforcing the size limit for bodies without a usable Content-Length
async fn read_body<B>(body: B, max_body_size: u64) -> Result<Bytes, Response<Full<Bytes>>>
where
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    let limit = usize::try_from(max_body_size).unwrap_or(usize::MAX);
    match Limited::new(body, limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
            logger::log_warning(&format!("Request body exceeded {max_body_size} bytes"));
            Err(http::build_413_response())
        }
        Err(e) => {
            let err = IngestError::internal(e);
            logger::log_error(&err.to_string());
            Err(http::build_text_response(err.status(), err.to_string()))
        }
    }
}

/// Map an ingestion outcome to its HTTP response
fn outcome_response(outcome: Result<IngestSummary, IngestError>) -> Response<Full<Bytes>> {
    match outcome {
        Ok(summary) => http::build_json_response(StatusCode::OK, &summary),
        Err(err) => {
            if let IngestError::Internal(detail) = &err {
                logger::log_error(&format!("Ingestion failed: {detail}"));
            } else {
                tracing::debug!(status = err.status().as_u16(), "{err}");
            }
            http::build_text_response(err.status(), err.to_string())
        }
    }
}

/// Header value decoded leniently; invalid UTF-8 is replaced rather than dropped
fn header_string<B>(req: &Request<B>, name: &str) -> Option<String> {
    req.headers()
        .get(name)
        .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
}

fn declared_length<B>(req: &Request<B>) -> Option<u64> {
    let value = req.headers().get(CONTENT_LENGTH)?;
    match value.to_str().ok().and_then(|s| s.trim().parse::<u64>().ok()) {
        Some(size) => Some(size),
        None => {
            logger::log_warning(&format!(
                "Invalid Content-Length value: {value:?}, skipping size check"
            ));
            None
        }
    }
}

fn version_str(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}
