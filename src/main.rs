//! Paginating webhook proxy.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request      ┌──────────────────────────────────────────────┐
//!     ────────────────────┼─▶ http::server ──▶ pagination::params        │
//!                         │        │            (directive, keys stripped)│
//!                         │        ▼                                     │
//!                         │   http::request ──────────────────────────────┼──▶ Upstream
//!                         │                                              │    webhook
//!     Client Response     │   http::response ◀── pagination::locator ◀───┼───
//!     ◀───────────────────┼─  (CORS, no-store,    + envelope             │
//!                         │   error envelopes)    (GET, 2xx, enabled)    │
//!                         └──────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use webhook_proxy::config::{self, ProxyConfig};
use webhook_proxy::lifecycle::startup;
use webhook_proxy::observability::logging;

#[derive(Parser)]
#[command(name = "webhook-proxy")]
#[command(about = "Reverse proxy that paginates webhook JSON responses", long_about = None)]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config: ProxyConfig = match &args.config {
        Some(path) => config::load_config(path)?,
        None => config::load_default()?,
    };

    logging::init(&config.observability.log_level);

    tracing::info!("webhook-proxy v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        target_url = %config.upstream.target_url,
        max_page_size = config.pagination.max_page_size,
        "Configuration loaded"
    );

    startup::run(config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
