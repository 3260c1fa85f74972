//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Every response (preflight, proxied, error):
//!     → headers.rs (CORS headers overlaid last, origin echoed)
//! ```
//!
//! # Design Decisions
//! - CORS policy is built once from config and shared read-only
//! - Inbound body size is capped by a middleware layer in the HTTP server

pub mod headers;

pub use headers::CorsPolicy;
