//! Startup orchestration.
//!
//! # Responsibilities
//! - Start the metrics exporter when enabled
//! - Bind the listener and serve until a shutdown signal
//!
//! # Design Decisions
//! - Config arrives already validated
//! - Listener binds last (traffic only when ready)

use std::net::SocketAddr;

use tokio::net::TcpListener;

use crate::config::ProxyConfig;
use crate::http::HttpServer;
use crate::lifecycle::{signals, Shutdown};
use crate::observability::metrics;

/// Run the proxy with `config` until SIGINT/SIGTERM.
pub async fn run(config: ProxyConfig) -> Result<(), Box<dyn std::error::Error>> {
    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr);
    }

    let server = HttpServer::new(config)?;

    let listener = TcpListener::bind(&server.config().listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        signals::wait_for_shutdown().await;
        shutdown.trigger();
    });

    server.run(listener, server_shutdown).await?;
    Ok(())
}
