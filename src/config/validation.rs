//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (page sizes, addresses)
//! - Check the upstream URL and CORS values are usable as-is
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use axum::http::HeaderValue;
use thiserror::Error;
use url::Url;

use crate::config::schema::ProxyConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: '{value}' is not a socket address")]
    InvalidAddress { field: &'static str, value: String },

    #[error("upstream.target_url: {reason}")]
    InvalidTargetUrl { reason: String },

    #[error("pagination: {reason}")]
    InvalidPageSize { reason: String },

    #[error("{field}: not a valid header value")]
    InvalidHeaderValue { field: &'static str },
}

/// Check a configuration, collecting every problem found.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }

    match Url::parse(&config.upstream.target_url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {}
        Ok(url) => errors.push(ValidationError::InvalidTargetUrl {
            reason: format!("unsupported scheme '{}'", url.scheme()),
        }),
        Err(e) => errors.push(ValidationError::InvalidTargetUrl {
            reason: e.to_string(),
        }),
    }

    let pagination = &config.pagination;
    if pagination.max_page_size == 0 {
        errors.push(ValidationError::InvalidPageSize {
            reason: "max_page_size must be at least 1".to_string(),
        });
    }
    if pagination.default_page_size == 0 || pagination.default_page_size > pagination.max_page_size {
        errors.push(ValidationError::InvalidPageSize {
            reason: format!(
                "default_page_size {} must be within 1..={}",
                pagination.default_page_size, pagination.max_page_size
            ),
        });
    }

    if HeaderValue::from_str(&config.cors.allow_methods).is_err() {
        errors.push(ValidationError::InvalidHeaderValue { field: "cors.allow_methods" });
    }
    if HeaderValue::from_str(&config.cors.allow_headers).is_err() {
        errors.push(ValidationError::InvalidHeaderValue { field: "cors.allow_headers" });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
