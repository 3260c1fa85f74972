//! Response handling and transformation.
//!
//! # Responsibilities
//! - Transform upstream response headers for the client
//! - Overlay CORS and `Cache-Control: no-store`
//! - Build the JSON error envelopes returned with 502
//!
//! # Design Decisions
//! - Upstream bodies are buffered, so framing headers are recomputed, not copied
//! - Error envelopes carry only `Content-Type` and CORS headers
//! - Upstream previews are truncated by characters, never inside a UTF-8 sequence

use axum::{
    body::{Body, Bytes},
    http::{
        header::{CACHE_CONTROL, CONTENT_LENGTH, CONTENT_TYPE},
        HeaderMap, HeaderValue, Method, StatusCode,
    },
    response::Response,
};
use serde_json::{json, Value};

use crate::error::ProxyError;
use crate::http::request::HOP_BY_HOP;
use crate::security::CorsPolicy;

/// `Content-Type` of error envelopes.
pub const JSON: &str = "application/json";

/// `Content-Type` of reshaped bodies.
pub const JSON_UTF8: &str = "application/json; charset=utf-8";

/// Maximum number of upstream body characters echoed in an error envelope.
pub const PREVIEW_CHARS: usize = 500;

/// Marker appended to a truncated preview.
pub const TRUNCATED_SUFFIX: &str = "...(truncado)";

/// Explanation attached to a failed GET forwarded to the webhook.
pub const UPSTREAM_ERROR_MESSAGE: &str = "The GET request was forwarded to the webhook, but it returned an error. \
     The webhook most likely expects a POST with a body.";

/// Upstream headers that can be passed to the client as-is.
pub fn passthrough_headers(upstream: &HeaderMap) -> HeaderMap {
    let mut headers = upstream.clone();
    headers.remove(CONTENT_LENGTH);
    for name in HOP_BY_HOP {
        headers.remove(name);
    }
    headers
}

/// Overlay CORS and cache headers onto a proxied response.
pub fn apply_client_headers(headers: &mut HeaderMap, cors: &CorsPolicy, origin: &HeaderValue) {
    cors.apply(headers, origin);
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));
}

/// Assemble a response from parts.
pub fn build(status: StatusCode, headers: HeaderMap, body: impl Into<Bytes>) -> Response {
    let mut response = Response::new(Body::from(body.into()));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}

/// Truncate an upstream body for inclusion in an error envelope.
pub fn preview(text: &str) -> String {
    match text.char_indices().nth(PREVIEW_CHARS) {
        Some((cut, _)) => format!("{}{}", &text[..cut], TRUNCATED_SUFFIX),
        None => text.to_string(),
    }
}

/// 502 envelope for an upstream that could not be reached or read.
pub fn fetch_failed(error: &ProxyError, cors: &CorsPolicy, origin: &HeaderValue) -> Response {
    error_envelope(
        json!({
            "ok": false,
            "error": "upstream_fetch_failed",
            "detail": error.detail(),
        }),
        cors,
        origin,
    )
}

/// 502 envelope explaining a non-2xx upstream answer to a GET.
pub fn upstream_error(
    status: StatusCode,
    upstream_body: &str,
    cors: &CorsPolicy,
    origin: &HeaderValue,
) -> Response {
    error_envelope(
        json!({
            "ok": false,
            "proxy": true,
            "method": Method::GET.as_str(),
            "upstream_status": status.as_u16(),
            "upstream_status_text": status.canonical_reason().unwrap_or(""),
            "message": UPSTREAM_ERROR_MESSAGE,
            "upstream_preview": preview(upstream_body),
        }),
        cors,
        origin,
    )
}

fn error_envelope(body: Value, cors: &CorsPolicy, origin: &HeaderValue) -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON));
    cors.apply(&mut headers, origin);
    build(StatusCode::BAD_GATEWAY, headers, body.to_string())
}
