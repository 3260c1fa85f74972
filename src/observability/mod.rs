//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Handler and middleware produce:
//!     → logging.rs (structured log events, request ID in every event)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout (tracing-subscriber fmt layer)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through logs, response headers and the upstream call
//! - Metrics are cheap (atomic increments) and no-ops until an exporter is installed

pub mod logging;
pub mod metrics;
