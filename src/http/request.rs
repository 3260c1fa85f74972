//! Request handling and transformation.
//!
//! # Responsibilities
//! - Generate unique request ID (UUID v4)
//! - Build the upstream URL from the inbound query string
//! - Prepare request headers for forwarding to the upstream
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - Pagination keys never reach the upstream
//! - Headers that describe the client connection or body framing are not forwarded

use axum::http::{header, HeaderMap, HeaderValue, Request};
use tower_http::request_id::{MakeRequestId, RequestId};
use url::{form_urlencoded, Url};
use uuid::Uuid;

use crate::pagination::is_pagination_key;

/// Header carrying the request ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Query key forced onto upstream requests when absent.
pub const TYPE_KEY: &str = "type";

/// Value forced for `TYPE_KEY`.
pub const TYPE_JSON: &str = "json";

/// Hop-by-hop headers, never forwarded in either direction.
pub const HOP_BY_HOP: [&str; 7] = [
    "connection",
    "keep-alive",
    "proxy-authorization",
    "proxy-connection",
    "te",
    "transfer-encoding",
    "upgrade",
];

/// Generates UUID v4 request IDs for `SetRequestIdLayer`.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// Read the request ID assigned by the request-id layer.
pub fn request_id(headers: &HeaderMap) -> String {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string()
}

/// Build the upstream URL: `base` plus every non-pagination query pair of
/// the inbound request, with `type=json` added when no `type` is present.
pub fn upstream_url(base: &Url, inbound_query: Option<&str>) -> Url {
    let mut url = base.clone();

    let forwarded: Vec<(String, String)> = inbound_query
        .map(|q| {
            form_urlencoded::parse(q.as_bytes())
                .filter(|(k, _)| !is_pagination_key(k))
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect()
        })
        .unwrap_or_default();

    if !forwarded.is_empty() {
        url.query_pairs_mut().extend_pairs(forwarded);
    }

    if !url.query_pairs().any(|(k, _)| k == TYPE_KEY) {
        url.query_pairs_mut().append_pair(TYPE_KEY, TYPE_JSON);
    }

    url
}

/// Copy inbound headers for the upstream request.
///
/// Drops `Host` (the client sets it from the upstream URL), hop-by-hop
/// headers, `Content-Length` (recomputed from the buffered body) and
/// `Accept-Encoding` (the body must arrive decoded to be reshaped).
pub fn forward_headers(inbound: &HeaderMap) -> HeaderMap {
    let mut headers = inbound.clone();
    headers.remove(header::HOST);
    headers.remove(header::CONTENT_LENGTH);
    headers.remove(header::ACCEPT_ENCODING);
    for name in HOP_BY_HOP {
        headers.remove(name);
    }
    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://hooks.example.com/webhook/dash").unwrap()
    }

    #[test]
    fn test_type_json_is_forced() {
        let url = upstream_url(&base(), None);
        assert_eq!(url.as_str(), "https://hooks.example.com/webhook/dash?type=json");
    }

    #[test]
    fn test_pagination_keys_are_stripped() {
        let url = upstream_url(
            &base(),
            Some("page=2&limit=10&per_page=1&page_size=3&pageSize=4&status=open"),
        );
        assert_eq!(url.as_str(), "https://hooks.example.com/webhook/dash?status=open&type=json");
    }

    #[test]
    fn test_existing_type_is_kept() {
        let url = upstream_url(&base(), Some("type=csv&q=a+b"));
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![("type".into(), "csv".into()), ("q".into(), "a b".into())]
        );
    }

    #[test]
    fn test_base_query_is_preserved() {
        let base = Url::parse("http://127.0.0.1:5678/hook?token=abc&type=xml").unwrap();
        let url = upstream_url(&base, Some("tag=x&tag=y"));
        assert_eq!(url.as_str(), "http://127.0.0.1:5678/hook?token=abc&type=xml&tag=x&tag=y");
    }

    #[test]
    fn test_forward_headers_drops_host() {
        let mut inbound = HeaderMap::new();
        inbound.insert(header::HOST, HeaderValue::from_static("proxy.local"));
        inbound.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer t"));
        inbound.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
        inbound.insert(header::CONTENT_LENGTH, HeaderValue::from_static("12"));
        inbound.insert(header::ACCEPT_ENCODING, HeaderValue::from_static("gzip"));
        inbound.append("x-custom", HeaderValue::from_static("one"));
        inbound.append("x-custom", HeaderValue::from_static("two"));

        let out = forward_headers(&inbound);
        assert!(out.get(header::HOST).is_none());
        assert!(out.get(header::CONNECTION).is_none());
        assert!(out.get(header::CONTENT_LENGTH).is_none());
        assert!(out.get(header::ACCEPT_ENCODING).is_none());
        assert_eq!(out[header::AUTHORIZATION], "Bearer t");
        assert_eq!(out.get_all("x-custom").iter().count(), 2);
    }

    #[test]
    fn test_uuid_request_id() {
        let request = Request::new(());
        let id = UuidRequestId.make_request_id(&request).unwrap();
        let text = id.header_value().to_str().unwrap();
        assert!(Uuid::parse_str(text).is_ok());
    }

    #[test]
    fn test_request_id_lookup() {
        let mut headers = HeaderMap::new();
        assert_eq!(request_id(&headers), "unknown");
        headers.insert(X_REQUEST_ID, HeaderValue::from_static("abc"));
        assert_eq!(request_id(&headers), "abc");
    }
}
