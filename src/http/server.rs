//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router whose fallback runs the webhook handler
//! - Wire up middleware (tracing, timeout, request ID)
//! - Bind server to a plain or TLS listener
//! - Answer requests the handler does not serve with 404
//! - Stop accepting on shutdown and drain in-flight deliveries

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    Extension, Router,
};
use axum_server::tls_rustls::RustlsConfig;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ReceiverConfig;
use crate::dispatch::WebhookHandler;
use crate::http::request::{ListenerProtocol, RequestExt};
use crate::lifecycle::shutdown;

/// Grace period for in-flight requests on TLS shutdown.
const TLS_DRAIN_SECS: u64 = 10;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub handler: Arc<WebhookHandler>,
}

/// HTTP server for the webhook receiver.
pub struct HttpServer {
    config: ReceiverConfig,
    handler: Arc<WebhookHandler>,
}

impl HttpServer {
    /// Create a new HTTP server serving `handler`.
    pub fn new(config: ReceiverConfig, handler: Arc<WebhookHandler>) -> Self {
        Self { config, handler }
    }

    /// The Axum router, tagging requests with the given listener protocol.
    pub fn router(&self, protocol: &'static str) -> Router {
        let state = AppState {
            handler: self.handler.clone(),
        };
        Self::build_router(&self.config, state, protocol)
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ReceiverConfig, state: AppState, protocol: &'static str) -> Router {
        Router::new()
            .fallback(webhook_handler)
            .with_state(state)
            .layer(Extension(ListenerProtocol(protocol)))
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http().make_span_with(
                        |req: &Request<Body>| {
                            tracing::info_span!(
                                "webhook_request",
                                method = %req.method(),
                                uri = %req.uri(),
                                request_id = req.request_id().unwrap_or("unknown")
                            )
                        },
                    ))
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(TimeoutLayer::new(Duration::from_secs(
                        config.limits.request_timeout_secs,
                    ))),
            )
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown_rx: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            endpoints = self.handler.router().endpoints().len(),
            "HTTP server starting"
        );

        let app = self.router("http");

        axum::serve(listener, app.into_make_service())
            .with_graceful_shutdown(shutdown::wait(shutdown_rx))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Run the server over TLS.
    pub async fn run_tls(
        self,
        addr: SocketAddr,
        tls: RustlsConfig,
        shutdown_rx: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        tracing::info!(
            address = %addr,
            endpoints = self.handler.router().endpoints().len(),
            "HTTPS server starting"
        );

        let app = self.router("https");

        let handle = axum_server::Handle::new();
        let drain = handle.clone();
        tokio::spawn(async move {
            shutdown::wait(shutdown_rx).await;
            drain.graceful_shutdown(Some(Duration::from_secs(TLS_DRAIN_SECS)));
        });

        axum_server::bind_rustls(addr, tls)
            .handle(handle)
            .serve(app.into_make_service())
            .await?;

        tracing::info!("HTTPS server stopped");
        Ok(())
    }

    pub fn handler(&self) -> &Arc<WebhookHandler> {
        &self.handler
    }

    pub fn config(&self) -> &ReceiverConfig {
        &self.config
    }
}

/// Every request goes through the webhook handler first.
async fn webhook_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    match state.handler.handle(request).await {
        Ok(response) => response,
        Err(request) => {
            tracing::debug!(
                method = %request.method(),
                uri = %request.uri(),
                "No webhook endpoint for request"
            );
            (StatusCode::NOT_FOUND, "no such location").into_response()
        }
    }
}
