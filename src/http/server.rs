//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the proxy and health handlers
//! - Wire up middleware (tracing, request ID)
//! - Bind server to listener
//! - Dispatch proxy requests to the relay engine
//! - Observability (metrics, correlation IDs)

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::{rejection::PathRejection, Path, State},
    http::Request,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::config::ProxyConfig;
use crate::error::ProxyError;
use crate::http::request::{propagate_request_id_layer, set_request_id_layer, RequestIdExt};
use crate::lifecycle::ShutdownSignal;
use crate::observability::metrics;
use crate::observability::tracing::request_span;
use crate::relay::{build_client, GitProxy};
use crate::routing::split_segments;
use crate::security::TokenSources;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub proxy: Arc<GitProxy>,
}

/// Error type for server construction.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("failed to build upstream client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("invalid upstream settings: {0}")]
    Proxy(#[from] ProxyError),
}

/// HTTP server for the Git relay.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
}

impl HttpServer {
    /// Create a server, snapshotting token variables from the environment.
    pub fn new(config: ProxyConfig) -> Result<Self, ServerError> {
        let tokens = TokenSources::from_env(config.credentials.token_env.iter().cloned());
        let client = build_client(&config.timeouts)?;
        Self::with_parts(config, tokens, client)
    }

    /// Create a server from explicit token sources and upstream client.
    pub fn with_parts(
        config: ProxyConfig,
        tokens: TokenSources,
        client: reqwest::Client,
    ) -> Result<Self, ServerError> {
        match tokens.resolve_named() {
            Some((source, _)) => tracing::info!(source, "GitHub token configured"),
            None => tracing::warn!(
                sources = ?tokens,
                "No GitHub token configured; github.com requests will be rejected"
            ),
        }
        if config.timeouts.is_unbounded() {
            tracing::warn!("No proxy timeouts configured; upstream requests are unbounded");
        }

        let proxy = GitProxy::new(client, tokens, &config.upstream)?
            .with_request_timeout(config.timeouts.request_timeout());
        let state = AppState {
            proxy: Arc::new(proxy),
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &ProxyConfig, state: AppState) -> Router {
        let mount = config.upstream.mount_path.as_str();

        let router = Router::new()
            .route("/healthz", get(health_handler))
            .route(mount, get(proxy_root_handler).post(proxy_root_handler))
            .route(
                &format!("{mount}/"),
                get(proxy_root_handler).post(proxy_root_handler),
            )
            .route(
                &format!("{mount}/{{*path}}"),
                get(proxy_handler).post(proxy_handler),
            )
            .with_state(state);

        router
            .layer(TraceLayer::new_for_http().make_span_with(request_span::<Body>))
            .layer(propagate_request_id_layer())
            .layer(set_request_id_layer())
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(self, listener: TcpListener, shutdown: ShutdownSignal) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            mount_path = %self.config.upstream.mount_path,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown.recv())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// The fully layered router, for driving the server without a listener.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }
}

#[derive(Serialize)]
struct HealthStatus {
    status: &'static str,
    version: &'static str,
}

async fn health_handler() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Proxy handler for `<mount>/{*path}`.
async fn proxy_handler(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    request: Request<Body>,
) -> Response {
    let capture = match path {
        Ok(Path(capture)) => capture,
        Err(rejection) => {
            let start = Instant::now();
            let method = request.method().to_string();
            let err = ProxyError::InvalidUpstreamTarget(rejection.body_text());
            return reject(&method, request.request_id(), err, start);
        }
    };
    relay(&state, &split_segments(&capture), request).await
}

/// Proxy handler for the bare mount path, which names no upstream.
async fn proxy_root_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let segments: [&str; 0] = [];
    relay(&state, &segments, request).await
}

async fn relay(state: &AppState, segments: &[&str], request: Request<Body>) -> Response {
    let start = Instant::now();
    let request_id = request.request_id().to_string();
    let method = request.method().to_string();

    tracing::debug!(request_id = %request_id, method = %method, "Proxying request");

    match state.proxy.handle(segments, request).await {
        Ok(response) => {
            let status = response.status();
            let outcome = if status.is_success() {
                "relayed"
            } else {
                "upstream_error"
            };
            tracing::info!(request_id = %request_id, status = %status, outcome, "Request relayed");
            metrics::record_request(&method, status.as_u16(), outcome, start);
            response
        }
        Err(err) => reject(&method, &request_id, err, start),
    }
}

fn reject(method: &str, request_id: &str, err: ProxyError, start: Instant) -> Response {
    let status = err.status();
    if status.is_server_error() {
        tracing::error!(request_id = %request_id, status = %status, error = %err, "Proxy failure");
    } else {
        tracing::warn!(request_id = %request_id, status = %status, error = %err, "Request rejected");
    }
    metrics::record_request(method, status.as_u16(), err.outcome(), start);
    err.into_response()
}
