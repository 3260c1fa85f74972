//! Pagination parameter extraction.
//!
//! # Responsibilities
//! - Turn the inbound query string into a `PaginationDirective`
//! - Identify the proxy-owned keys that must not reach the upstream
//!
//! # Design Decisions
//! - Never fails: malformed values fall back to defaults
//! - A key counts as present even when its value is unusable
//! - The size cap is applied after parsing

use url::form_urlencoded;

use crate::config::PaginationConfig;

/// Key carrying the 1-indexed page number.
pub const PAGE_KEY: &str = "page";

/// Page size aliases, in precedence order.
pub const SIZE_KEYS: [&str; 4] = ["limit", "per_page", "page_size", "pageSize"];

/// Every query key consumed by the proxy.
pub const PAGINATION_KEYS: [&str; 5] = ["page", "limit", "per_page", "page_size", "pageSize"];

/// Returns true if `key` is consumed by the proxy and must not be forwarded.
pub fn is_pagination_key(key: &str) -> bool {
    PAGINATION_KEYS.contains(&key)
}

/// How the client wants the located array sliced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationDirective {
    /// True iff a page or size key was present.
    pub enabled: bool,
    /// 1-indexed page number.
    pub page: u64,
    /// Items per page, within `1..=max_page_size`.
    pub page_size: u64,
}

impl PaginationDirective {
    /// A directive that leaves responses untouched.
    pub fn disabled(limits: &PaginationConfig) -> Self {
        Self {
            enabled: false,
            page: 1,
            page_size: limits.default_page_size,
        }
    }

    /// Build a directive from a raw (still percent-encoded) query string.
    pub fn from_query(query: Option<&str>, limits: &PaginationConfig) -> Self {
        let pairs: Vec<(String, String)> = query
            .map(|q| {
                form_urlencoded::parse(q.as_bytes())
                    .map(|(k, v)| (k.into_owned(), v.into_owned()))
                    .collect()
            })
            .unwrap_or_default();

        Self::from_pairs(&pairs, limits)
    }

    /// Build a directive from already decoded query pairs.
    pub fn from_pairs(pairs: &[(String, String)], limits: &PaginationConfig) -> Self {
        let first = |key: &str| {
            pairs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
        };

        let page_raw = first(PAGE_KEY);
        let size_raw = SIZE_KEYS.iter().find_map(|key| first(*key));

        if page_raw.is_none() && size_raw.is_none() {
            return Self::disabled(limits);
        }

        let page = sanitize_positive_int(page_raw, 1, None);
        let page_size = sanitize_positive_int(
            size_raw,
            limits.default_page_size,
            Some(limits.max_page_size),
        );

        Self {
            enabled: true,
            page,
            page_size,
        }
    }

    /// Index of the first item on the requested page.
    pub fn start(&self) -> u64 {
        (self.page - 1).saturating_mul(self.page_size)
    }
}

/// Parse `value` as a positive number, floored. Falls back when the value is
/// missing, not finite, or below one after flooring.
fn sanitize_positive_int(value: Option<&str>, fallback: u64, max: Option<u64>) -> u64 {
    let parsed = match value.and_then(|v| v.trim().parse::<f64>().ok()) {
        Some(n) if n.is_finite() && n > 0.0 => n.floor(),
        _ => return fallback,
    };

    if parsed < 1.0 {
        return fallback;
    }

    // Saturating float-to-int conversion.
    let normalized = parsed as u64;
    match max {
        Some(max) => normalized.min(max),
        None => normalized,
    }
}
