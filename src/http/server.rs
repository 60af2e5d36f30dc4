//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, timeout, request ID)
//! - Mount the proxy under the ingress prefix
//! - Mount the client-context endpoints under `/edge`
//! - Bind server to listener with graceful shutdown

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware,
    response::Response,
    routing::{any, get},
    Router,
};
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::validation::validate_config;
use crate::config::{ConfigError, EdgeConfig};
use crate::geo::{attach_client_context, IpApiClient, Resolver};
use crate::http::request::{request_id, MakeEdgeRequestId};
use crate::http::status;
use crate::lifecycle::shutdown;
use crate::proxy::Forwarder;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to build geolocation client: {0}")]
    GeoClient(#[from] reqwest::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Application state injected into proxy handlers.
#[derive(Clone)]
pub struct AppState {
    pub forwarder: Arc<Forwarder>,
    /// Ingress prefix without trailing slash; stripped from inbound paths.
    pub ingress_prefix: Arc<str>,
}

/// HTTP server for the edge.
pub struct HttpServer {
    router: Router,
    config: EdgeConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: EdgeConfig) -> Result<Self, ServerError> {
        validate_config(&config).map_err(ConfigError::Validation)?;

        let forwarder = Arc::new(Forwarder::new(&config.proxy));
        let ingress_prefix = Arc::from(config.proxy.ingress_prefix.trim_end_matches('/'));
        let resolver = Arc::new(Resolver::new(
            IpApiClient::new(&config.geolocation)?,
            Duration::from_secs(config.geolocation.timeout_secs),
        ));

        let router = Self::build_router(
            &config,
            AppState {
                forwarder,
                ingress_prefix,
            },
            resolver,
        );
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(
        config: &EdgeConfig,
        state: AppState,
        resolver: Arc<Resolver<IpApiClient>>,
    ) -> Router {
        let prefix = config.proxy.ingress_prefix.trim_end_matches('/');

        let proxy = Router::new()
            .route(&format!("{prefix}/{{*path}}"), any(proxy_handler))
            .route(if prefix.is_empty() { "/" } else { prefix }, any(proxy_handler))
            .with_state(state);

        let edge = Router::new()
            .route("/edge/health", get(status::get_health))
            .route(
                "/edge/client",
                get(status::get_client).layer(middleware::from_fn_with_state(
                    resolver,
                    attach_client_context::<IpApiClient>,
                )),
            );

        edge.merge(proxy)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeEdgeRequestId))
    }

    /// Run the server, accepting connections until `shutdown_rx` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown_rx: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            backend_origin = %self.config.proxy.backend_origin,
            "HTTP server starting"
        );

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown::wait_for(shutdown_rx))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Forward everything below the ingress prefix.
///
/// The suffix is cut from the raw URI path so percent-encoding reaches the
/// backend untouched.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let path = request
        .uri()
        .path()
        .strip_prefix(&*state.ingress_prefix)
        .unwrap_or_default()
        .to_string();

    tracing::debug!(
        request_id = %request_id(request.headers()),
        method = %request.method(),
        path = %path,
        "Inbound proxy request"
    );

    let captured = state.forwarder.capture(request, &path).await;
    state.forwarder.forward(captured).await
}
