//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the catch-all proxy handler
//! - Wire up middleware (tracing, body limit, request ID)
//! - Bind server to listener
//! - Forward requests to the upstream webhook
//! - Reshape paginated GET responses
//! - Observability (metrics, correlation IDs)

use axum::{
    body::Body,
    extract::State,
    http::{header::CONTENT_TYPE, HeaderValue, Method, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use url::Url;

use crate::config::{PaginationConfig, ProxyConfig};
use crate::error::ProxyError;
use crate::http::request::{self, UuidRequestId};
use crate::http::response;
use crate::observability::metrics;
use crate::pagination::{self, PaginationDirective, Reshape};
use crate::security::CorsPolicy;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub client: reqwest::Client,
    pub target: Arc<Url>,
    pub cors: Arc<CorsPolicy>,
    pub pagination: PaginationConfig,
}

/// HTTP server for the proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ProxyConfig) -> Result<Self, ProxyError> {
        let target = Url::parse(&config.upstream.target_url)?;

        // Redirects are surfaced to the client, and the upstream is always
        // contacted directly.
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .no_proxy()
            .build()
            .map_err(ProxyError::Client)?;

        let state = AppState {
            client,
            target: Arc::new(target),
            cors: Arc::new(CorsPolicy::from_config(&config.cors)),
            pagination: config.pagination.clone(),
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &ProxyConfig, state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(RequestBodyLimitLayer::new(config.security.max_body_size)),
            )
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            upstream = %self.config.upstream.target_url,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }
}

/// Main proxy handler.
/// Forwards the request upstream and shapes the answer for the client.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start_time = Instant::now();
    let request_id = request::request_id(request.headers());
    let method = request.method().clone();
    let origin = CorsPolicy::origin_of(request.headers());

    // 1. Preflight never reaches the upstream
    if method == Method::OPTIONS {
        metrics::record_request(method.as_str(), 204, "preflight", start_time);
        return state.cors.preflight(&origin);
    }

    // 2. Pagination directive and upstream URL
    let query = request.uri().query();
    let directive = PaginationDirective::from_query(query, &state.pagination);
    let target = request::upstream_url(&state.target, query);

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        path = %request.uri().path(),
        paginate = directive.enabled,
        "Proxying request"
    );

    // 3. Buffer the body for methods that carry one
    let (parts, body) = request.into_parts();
    let body = if method == Method::GET || method == Method::HEAD {
        None
    } else {
        match axum::body::to_bytes(body, usize::MAX).await {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                tracing::warn!(request_id = %request_id, error = %e, "Failed to read request body");
                metrics::record_request(method.as_str(), 413, "rejected", start_time);
                let mut response = (StatusCode::PAYLOAD_TOO_LARGE, ProxyError::from(e).to_string())
                    .into_response();
                state.cors.apply(response.headers_mut(), &origin);
                return response;
            }
        }
    };

    // 4. Forward
    let mut upstream = state
        .client
        .request(method.clone(), target)
        .headers(request::forward_headers(&parts.headers));
    if let Some(bytes) = body {
        upstream = upstream.body(bytes);
    }

    let (status, upstream_headers, upstream_body) = match fetch(upstream).await {
        Ok(answer) => answer,
        Err(e) => {
            tracing::error!(request_id = %request_id, error = %e.detail(), "Upstream error");
            metrics::record_request(method.as_str(), 502, "fetch_failed", start_time);
            return response::fetch_failed(&e, &state.cors, &origin);
        }
    };

    // 5. Failed GET gets an explanatory envelope
    if !status.is_success() && method == Method::GET {
        tracing::warn!(
            request_id = %request_id,
            upstream_status = status.as_u16(),
            "Upstream rejected GET"
        );
        metrics::record_request(method.as_str(), 502, "upstream_error", start_time);
        let text = String::from_utf8_lossy(&upstream_body);
        return response::upstream_error(status, &text, &state.cors, &origin);
    }

    let mut headers = response::passthrough_headers(&upstream_headers);
    response::apply_client_headers(&mut headers, &state.cors, &origin);

    // 6. Reshape paginated GETs, pass everything else through
    if directive.enabled && status.is_success() && method == Method::GET {
        let reshaped = pagination::reshape_body(&upstream_body, &directive);
        metrics::record_reshape(reshaped.label());

        match reshaped {
            Reshape::Paginated(payload) => {
                headers.insert(CONTENT_TYPE, HeaderValue::from_static(response::JSON_UTF8));
                metrics::record_request(method.as_str(), status.as_u16(), "paginated", start_time);
                return response::build(status, headers, payload.to_string());
            }
            other => {
                tracing::debug!(
                    request_id = %request_id,
                    reason = other.label(),
                    "Pagination skipped, passing body through"
                );
            }
        }
    }

    metrics::record_request(method.as_str(), status.as_u16(), "proxied", start_time);
    response::build(status, headers, upstream_body)
}

/// Send the upstream request and read the whole answer.
async fn fetch(
    request: reqwest::RequestBuilder,
) -> Result<(StatusCode, axum::http::HeaderMap, axum::body::Bytes), ProxyError> {
    let answer = request.send().await.map_err(ProxyError::UpstreamFetch)?;
    let status = answer.status();
    let headers = answer.headers().clone();
    let body = answer.bytes().await.map_err(ProxyError::UpstreamBody)?;
    Ok((status, headers, body))
}
