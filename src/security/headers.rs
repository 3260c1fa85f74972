//! CORS header construction.
//!
//! # Responsibilities
//! - Build the `Access-Control-*` header set from config
//! - Echo the request `Origin`, or `*` when there is none
//! - Answer preflight requests without touching the upstream
//!
//! # Design Decisions
//! - Header values are parsed once at startup, not per request
//! - Applied with `insert`, so upstream CORS headers are always overwritten

use axum::{
    body::Body,
    http::{
        header::{
            ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
            ACCESS_CONTROL_ALLOW_ORIGIN, ACCESS_CONTROL_MAX_AGE, ORIGIN,
        },
        HeaderMap, HeaderValue, StatusCode,
    },
    response::Response,
};

use crate::config::schema::{CorsConfig, DEFAULT_ALLOW_HEADERS, DEFAULT_ALLOW_METHODS};

/// CORS policy applied to every response.
#[derive(Debug, Clone)]
pub struct CorsPolicy {
    allow_methods: HeaderValue,
    allow_headers: HeaderValue,
    max_age: HeaderValue,
}

impl CorsPolicy {
    /// Build the policy. Invalid values fall back to the defaults; config
    /// validation rejects them before this point.
    pub fn from_config(config: &CorsConfig) -> Self {
        let parse = |value: &str, fallback: &'static str| {
            HeaderValue::from_str(value).unwrap_or(HeaderValue::from_static(fallback))
        };

        Self {
            allow_methods: parse(&config.allow_methods, DEFAULT_ALLOW_METHODS),
            allow_headers: parse(&config.allow_headers, DEFAULT_ALLOW_HEADERS),
            max_age: HeaderValue::from(config.max_age_secs),
        }
    }

    /// The origin to echo for a request: its `Origin` header or `*`.
    pub fn origin_of(request_headers: &HeaderMap) -> HeaderValue {
        request_headers
            .get(ORIGIN)
            .cloned()
            .unwrap_or_else(|| HeaderValue::from_static("*"))
    }

    /// Overwrite the CORS headers in `headers`.
    pub fn apply(&self, headers: &mut HeaderMap, origin: &HeaderValue) {
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, origin.clone());
        headers.insert(ACCESS_CONTROL_ALLOW_METHODS, self.allow_methods.clone());
        headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, self.allow_headers.clone());
        headers.insert(ACCESS_CONTROL_MAX_AGE, self.max_age.clone());
    }

    /// 204 response for an `OPTIONS` preflight, carrying only CORS headers.
    pub fn preflight(&self, origin: &HeaderValue) -> Response {
        let mut response = Response::new(Body::empty());
        *response.status_mut() = StatusCode::NO_CONTENT;
        self.apply(response.headers_mut(), origin);
        response
    }
}

impl Default for CorsPolicy {
    fn default() -> Self {
        Self::from_config(&CorsConfig::default())
    }
}
