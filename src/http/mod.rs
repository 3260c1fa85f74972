//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, body limit, tracing)
//!     → request.rs (pagination keys stripped, headers prepared)
//!     → upstream webhook (reqwest, redirects not followed)
//!     → [pagination reshapes paginated GET bodies]
//!     → response.rs (CORS, no-store, error envelopes)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{UuidRequestId, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
