//! Response pagination subsystem.
//!
//! # Data Flow
//! ```text
//! inbound query string
//!     → params.rs (PaginationDirective, pagination keys stripped)
//!
//! upstream JSON body (GET, 2xx, directive enabled)
//!     → locator.rs (find the array to paginate, remember where it lives)
//!     → envelope.rs (slice, rebuild, attach pagination metadata)
//!     → reshaped body replaces the upstream body
//! ```
//!
//! # Design Decisions
//! - Best effort: a body that is not JSON or has no array passes through untouched
//! - The located array is addressed by a path, the original value is never mutated
//! - Search order and nesting depth are constants so they can be tested in isolation

pub mod envelope;
pub mod locator;
pub mod params;

use serde_json::Value;

pub use envelope::{paginate, PaginationMeta};
pub use locator::{locate, ArrayTarget, Encoding, MAX_NESTING_DEPTH, PREFERRED_KEYS};
pub use params::{is_pagination_key, PaginationDirective, PAGINATION_KEYS, SIZE_KEYS};

/// Outcome of running the reshaping pipeline over an upstream body.
#[derive(Debug, Clone, PartialEq)]
pub enum Reshape {
    /// The body was paginated; this is the new payload.
    Paginated(Value),
    /// The body is not valid JSON.
    NotJson,
    /// The body is JSON but holds no array to paginate.
    NoArray,
}

impl Reshape {
    /// Label used for metrics and logs.
    pub fn label(&self) -> &'static str {
        match self {
            Reshape::Paginated(_) => "reshaped",
            Reshape::NotJson => "not_json",
            Reshape::NoArray => "no_array",
        }
    }
}

/// Parse `body`, locate its array and paginate it according to `directive`.
pub fn reshape_body(body: &[u8], directive: &PaginationDirective) -> Reshape {
    let root: Value = match serde_json::from_slice(body) {
        Ok(value) => value,
        Err(_) => return Reshape::NotJson,
    };

    match locate(&root) {
        Some(target) => Reshape::Paginated(paginate(&root, &target, directive)),
        None => Reshape::NoArray,
    }
}
