//! Proxy error types.

use thiserror::Error;

/// Errors raised while serving a proxied request.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// The upstream HTTP client could not be constructed.
    #[error("failed to build upstream client: {0}")]
    Client(#[source] reqwest::Error),

    /// The configured upstream URL is unusable.
    #[error("invalid upstream url: {0}")]
    UpstreamUrl(#[from] url::ParseError),

    /// The upstream could not be reached.
    #[error("{0}")]
    UpstreamFetch(#[source] reqwest::Error),

    /// The upstream answered but its body could not be read.
    #[error("{0}")]
    UpstreamBody(#[source] reqwest::Error),

    /// The inbound request body could not be read (or was too large).
    #[error("failed to read request body: {0}")]
    RequestBody(#[from] axum::Error),
}

impl ProxyError {
    /// Message exposed to clients in the `detail` field of a 502 envelope.
    pub fn detail(&self) -> String {
        let mut detail = self.to_string();
        let mut source = std::error::Error::source(self);
        // reqwest hides the interesting part (refused, dns, ...) in the chain.
        while let Some(err) = source {
            let text = err.to_string();
            if !detail.contains(&text) {
                detail.push_str(": ");
                detail.push_str(&text);
            }
            source = err.source();
        }
        detail
    }
}
