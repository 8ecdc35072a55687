//! Records handed to listeners.

use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, Uri, Version};
use serde::Serialize;
use serde_json::Value;

use crate::dispatch::WebhookError;
use crate::signing::Provider;

/// A verified delivery.
///
/// Built once per accepted request and shared with every listener through
/// an `Arc`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WebhookEvent {
    /// Event name from the provider's event header (e.g. `push`).
    pub event: String,
    /// Delivery id from the provider's delivery header.
    pub id: String,
    /// Parsed JSON body.
    pub payload: Value,
    /// Request url as received (path and query).
    pub url: String,
    /// Path of the endpoint that accepted the request.
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    pub provider: Provider,
}

impl WebhookEvent {
    /// `payload.repository.name`, when the host sends one.
    pub fn repository_name(&self) -> Option<&str> {
        self.payload
            .get("repository")
            .and_then(|repo| repo.get("name"))
            .and_then(Value::as_str)
    }
}

/// The parts of a request that outlive its body.
#[derive(Debug, Clone)]
pub struct RequestHead {
    pub method: Method,
    pub uri: Uri,
    pub version: Version,
    pub headers: HeaderMap,
}

impl RequestHead {
    pub fn of(request: &Request<Body>) -> Self {
        Self {
            method: request.method().clone(),
            uri: request.uri().clone(),
            version: request.version(),
            headers: request.headers().clone(),
        }
    }
}

/// A rejected delivery, published on the `error` channel.
#[derive(Debug, Clone)]
pub struct WebhookFailure {
    pub error: WebhookError,
    /// The request that was rejected.
    pub request: RequestHead,
}

impl WebhookFailure {
    pub fn message(&self) -> String {
        self.error.to_string()
    }
}
