//! Response builders shared by the handlers.

use crate::cache::etag;
use crate::config::CacheConfig;
use axum::Json;
use axum::body::Body;
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::any::Any;
use tracing::error;

pub const SERVER_ERROR: &str = "Server error";

/// `{ "error": message }` with `status`.
pub fn error_json(status: StatusCode, message: &str) -> Response {
    (status, Json(serde_json::json!({ "error": message }))).into_response()
}

/// Serialize `body` as a cacheable listing.
///
/// Adds `Cache-Control` and a strong `ETag`. When the request's
/// `If-None-Match` already names that ETag the body is dropped and the
/// response is `304 Not Modified`.
pub fn cached_json<T: Serialize>(request: &HeaderMap, cache: &CacheConfig, body: &T) -> Response {
    let bytes = match serde_json::to_vec(body) {
        Ok(bytes) => bytes,
        Err(err) => {
            error!(error = %err, "failed to serialize listing");
            return error_json(StatusCode::INTERNAL_SERVER_ERROR, SERVER_ERROR);
        }
    };
    let tag = etag(&bytes);

    let mut response = if if_none_match(request, &tag) {
        StatusCode::NOT_MODIFIED.into_response()
    } else {
        let mut response = Response::new(Body::from(bytes));
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        response
    };

    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(&cache.cache_control()) {
        headers.insert(header::CACHE_CONTROL, value);
    }
    if let Ok(value) = HeaderValue::from_str(&tag) {
        headers.insert(header::ETAG, value);
    }
    response
}

fn if_none_match(request: &HeaderMap, tag: &str) -> bool {
    request
        .get_all(header::IF_NONE_MATCH)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(|candidate| candidate.trim().trim_start_matches("W/"))
        .any(|candidate| candidate == "*" || candidate == tag)
}

/// Panic hook for `CatchPanicLayer`.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!(panic = detail, "handler panicked");
    error_json(StatusCode::INTERNAL_SERVER_ERROR, SERVER_ERROR)
}
