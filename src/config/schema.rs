//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Upstream used when neither the config file nor `TARGET_URL` name one.
pub const DEFAULT_TARGET_URL: &str = "https://n8n.athenas.me/webhook/dash-revoltado";

/// Default `Access-Control-Allow-Methods`.
pub const DEFAULT_ALLOW_METHODS: &str = "GET,POST,PUT,PATCH,DELETE,OPTIONS";

/// Default `Access-Control-Allow-Headers`.
pub const DEFAULT_ALLOW_HEADERS: &str = "Content-Type, Authorization";

/// Root configuration for the proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// The single upstream webhook.
    pub upstream: UpstreamConfig,

    /// Page size defaults and limits.
    pub pagination: PaginationConfig,

    /// CORS policy applied to every response.
    pub cors: CorsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Inbound request limits.
    pub security: SecurityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// Upstream configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL every request is forwarded to. Overridden by `TARGET_URL`.
    pub target_url: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            target_url: DEFAULT_TARGET_URL.to_string(),
        }
    }
}

/// Page size configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct PaginationConfig {
    /// Page size when the client sends none (or an invalid one).
    pub default_page_size: u64,

    /// Upper bound applied to client supplied page sizes.
    pub max_page_size: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page_size: 100,
            max_page_size: 1000,
        }
    }
}

/// CORS configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Value of `Access-Control-Allow-Methods`.
    pub allow_methods: String,

    /// Value of `Access-Control-Allow-Headers`.
    pub allow_headers: String,

    /// Value of `Access-Control-Max-Age`, in seconds.
    pub max_age_secs: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allow_methods: DEFAULT_ALLOW_METHODS.to_string(),
            allow_headers: DEFAULT_ALLOW_HEADERS.to_string(),
            max_age_secs: 86_400,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Inbound request limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Maximum inbound body size in bytes.
    pub max_body_size: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            max_body_size: 2 * 1024 * 1024, // 2MB
        }
    }
}
