//! The webhook handler: validate a delivery, answer it, publish it.

use std::sync::Arc;
use std::time::Instant;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::Value;

use crate::config::validation::validate_config;
use crate::config::{ConfigError, LimitsConfig, ReceiverConfig};
use crate::dispatch::error::WebhookError;
use crate::events::{EventEmitter, Message, RequestHead, SubscriptionId, WebhookEvent, WebhookFailure};
use crate::http::request::RequestExt;
use crate::http::response::{
    error_body, BufferedResponse, ResponseWriter, JSON_CONTENT_TYPE, SUCCESS_BODY,
};
use crate::observability::metrics;
use crate::routing::{Endpoint, Endpoints, Router};
use crate::signing::{self, Provider};

/// How a call to [`WebhookHandler::dispatch`] ended.
#[derive(Debug)]
pub enum DispatchOutcome {
    /// Verified, answered with `200`, published.
    Published(Arc<WebhookEvent>),
    /// Not ours (path or method mismatch). Nothing was written.
    NotHandled(Request<Body>),
    /// Rejected, answered with `400`, published on `error`.
    Failed(Arc<WebhookFailure>),
}

/// Receives signed callbacks and fans verified events out to listeners.
#[derive(Debug)]
pub struct WebhookHandler {
    router: Router,
    emitter: Arc<EventEmitter>,
    max_body_size: usize,
}

impl WebhookHandler {
    /// Build a handler for one endpoint or a list of endpoints.
    pub fn new(endpoints: impl Into<Endpoints>) -> Result<Self, ConfigError> {
        Ok(Self {
            router: Router::new(endpoints)?,
            emitter: Arc::new(EventEmitter::new()),
            max_body_size: LimitsConfig::default().max_body_size,
        })
    }

    /// Build a handler from a full receiver configuration.
    pub fn from_config(config: &ReceiverConfig) -> Result<Self, ConfigError> {
        validate_config(config)?;
        Ok(Self::new(config.endpoint_definitions())?.with_max_body_size(config.limits.max_body_size))
    }

    pub fn with_max_body_size(mut self, max_body_size: usize) -> Self {
        self.max_body_size = max_body_size;
        self
    }

    /// The listener registry.
    pub fn events(&self) -> &Arc<EventEmitter> {
        &self.emitter
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    /// Sign `data` with the first endpoint's secret (`sha1=<hex>`).
    pub fn sign(&self, data: impl AsRef<[u8]>) -> String {
        signing::sign(self.router.primary().secret(), data.as_ref())
    }

    /// Verify a `sha1=` signature with the first endpoint's secret.
    pub fn verify(&self, signature: &str, data: impl AsRef<[u8]>) -> bool {
        signing::verify(self.router.primary().secret(), signature, data.as_ref())
    }

    pub fn subscribe<F>(&self, channel: impl Into<String>, listener: F) -> SubscriptionId
    where
        F: Fn(&Message) + Send + Sync + 'static,
    {
        self.emitter.subscribe(channel, listener)
    }

    pub fn unsubscribe(&self, channel: &str, id: SubscriptionId) -> bool {
        self.emitter.unsubscribe(channel, id)
    }

    /// Synchronously call the listeners of `channel`.
    pub fn emit(&self, channel: &str, message: &Message) -> usize {
        self.emitter.emit(channel, message)
    }

    /// Run one request through routing, validation and publication.
    ///
    /// The answer is written to `res` before any listener runs. A request
    /// that is not ours is handed back untouched in
    /// [`DispatchOutcome::NotHandled`].
    pub async fn dispatch<W>(&self, req: Request<Body>, res: &mut W) -> DispatchOutcome
    where
        W: ResponseWriter + ?Sized,
    {
        let started = Instant::now();
        let url = req.url();
        let endpoint = self.router.resolve(&url);

        if req.uri().path() != endpoint.path() || req.method() != Method::POST {
            tracing::debug!(
                method = %req.method(),
                url = %url,
                endpoint = %endpoint.path(),
                "Request not handled by webhook endpoint"
            );
            metrics::record_not_handled();
            return DispatchOutcome::NotHandled(req);
        }

        let provider = endpoint.provider_for(req.headers());
        let head = RequestHead::of(&req);

        match self.validate(endpoint, provider, url, req).await {
            Ok(event) => {
                res.write(StatusCode::OK, JSON_CONTENT_TYPE, SUCCESS_BODY.to_string());

                let event = Arc::new(event);
                tracing::info!(
                    provider = %provider,
                    event = %event.event,
                    delivery = %event.id,
                    path = %event.path,
                    "Webhook delivery accepted"
                );
                self.emitter.publish_event(event.clone());
                metrics::record_delivery(provider, "accepted", started);
                DispatchOutcome::Published(event)
            }
            Err(error) => {
                res.write(
                    StatusCode::BAD_REQUEST,
                    JSON_CONTENT_TYPE,
                    error_body(&error.to_string()),
                );

                tracing::warn!(
                    provider = %provider,
                    kind = error.kind(),
                    error = %error,
                    uri = %head.uri,
                    "Webhook delivery rejected"
                );
                let failure = Arc::new(WebhookFailure { error, request: head });
                self.emitter.publish_failure(failure.clone());
                metrics::record_delivery(provider, failure.error.kind(), started);
                DispatchOutcome::Failed(failure)
            }
        }
    }

    /// Dispatch and turn the outcome into an HTTP response.
    ///
    /// `Err` gives back a request this handler does not serve, so a host
    /// server can fall through to its own routes.
    pub async fn handle(&self, req: Request<Body>) -> Result<Response, Request<Body>> {
        let mut res = BufferedResponse::new();
        match self.dispatch(req, &mut res).await {
            DispatchOutcome::NotHandled(req) => Err(req),
            DispatchOutcome::Published(_) | DispatchOutcome::Failed(_) => Ok(res
                .into_response()
                .unwrap_or_else(|| StatusCode::INTERNAL_SERVER_ERROR.into_response())),
        }
    }

    async fn validate(
        &self,
        endpoint: &Endpoint,
        provider: Provider,
        url: String,
        req: Request<Body>,
    ) -> Result<WebhookEvent, WebhookError> {
        let names = provider.headers();

        let signature = req
            .header_str(names.signature)
            .ok_or(WebhookError::MissingHeader { header: names.signature_display })?
            .to_string();
        let event = req
            .header_str(names.event)
            .ok_or(WebhookError::MissingHeader { header: names.event_display })?
            .to_string();
        let id = req
            .header_str(names.delivery)
            .ok_or(WebhookError::MissingHeader { header: names.delivery_display })?
            .to_string();

        if !endpoint.filter.accepts(&event) {
            return Err(WebhookError::EventNotAcceptable {
                header: names.event_display,
                event,
            });
        }

        let host = req.host();
        let protocol = req.protocol();

        let blob = axum::body::to_bytes(req.into_body(), self.max_body_size)
            .await
            .map_err(|e| WebhookError::BodyRead(body_error_message(&e)))?;

        if !provider.verify(endpoint.secret(), &signature, &blob) {
            return Err(WebhookError::SignatureMismatch {
                header: names.signature_display,
            });
        }

        let payload: Value = serde_json::from_slice(&blob)
            .map_err(|e| WebhookError::PayloadParse(e.to_string()))?;

        Ok(WebhookEvent {
            event,
            id,
            payload,
            url,
            path: endpoint.path().to_string(),
            host,
            protocol,
            provider,
        })
    }
}

/// Innermost message of a body error (the stream's own error text).
fn body_error_message(error: &axum::Error) -> String {
    let mut source: &dyn std::error::Error = error;
    while let Some(next) = source.source() {
        source = next;
    }
    source.to_string()
}
