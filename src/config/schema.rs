//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the receiver.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::routing::Endpoints;
use crate::signing::Provider;

/// Root configuration for the webhook receiver.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ReceiverConfig {
    /// Listener configuration (bind address, TLS).
    pub listener: ListenerConfig,

    /// A single endpoint. Matched regardless of request path.
    pub endpoint: Option<EndpointConfig>,

    /// Several endpoints, matched by exact path.
    pub endpoints: Vec<EndpointConfig>,

    /// Request limits.
    pub limits: LimitsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl ReceiverConfig {
    /// Endpoint definitions in the shape the router expects.
    ///
    /// A lone `[endpoint]` table wins over `[[endpoints]]`; validation
    /// rejects configs that set both.
    pub fn endpoint_definitions(&self) -> Endpoints {
        match &self.endpoint {
            Some(single) => Endpoints::Single(single.clone()),
            None => Endpoints::Many(self.endpoints.clone()),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:5000").
    pub bind_address: String,

    /// Optional TLS configuration.
    pub tls: Option<TlsConfig>,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:5000".to_string(),
            tls: None,
        }
    }
}

/// TLS configuration for the listener.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TlsConfig {
    /// Path to certificate file (PEM).
    pub cert_path: String,

    /// Path to private key file (PEM).
    pub key_path: String,
}

/// One webhook endpoint: where deliveries arrive and how they are checked.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct EndpointConfig {
    /// Request path this endpoint answers on (exact match).
    pub path: String,

    /// Shared secret used to verify signatures.
    pub secret: String,

    /// Allow-list of event names. Absent means every event.
    #[serde(default, alias = "accepted_events", skip_serializing_if = "Option::is_none")]
    pub events: Option<AcceptedEvents>,

    /// Pin the verification strategy instead of detecting it per request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<Provider>,
}

impl EndpointConfig {
    pub fn new(path: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            secret: secret.into(),
            events: None,
            provider: None,
        }
    }

    pub fn with_events(mut self, events: impl Into<AcceptedEvents>) -> Self {
        self.events = Some(events.into());
        self
    }

    pub fn with_provider(mut self, provider: Provider) -> Self {
        self.provider = Some(provider);
        self
    }
}

/// Event allow-list as written in config: `"push"` or `["push", "issues"]`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum AcceptedEvents {
    One(String),
    Many(Vec<String>),
}

impl From<&str> for AcceptedEvents {
    fn from(value: &str) -> Self {
        AcceptedEvents::One(value.to_string())
    }
}

impl From<String> for AcceptedEvents {
    fn from(value: String) -> Self {
        AcceptedEvents::One(value)
    }
}

impl From<Vec<String>> for AcceptedEvents {
    fn from(value: Vec<String>) -> Self {
        AcceptedEvents::Many(value)
    }
}

impl From<Vec<&str>> for AcceptedEvents {
    fn from(value: Vec<&str>) -> Self {
        AcceptedEvents::Many(value.into_iter().map(str::to_string).collect())
    }
}

/// Request limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum body size in bytes.
    pub max_body_size: usize,

    /// Request timeout (total time for request/response) in seconds.
    pub request_timeout_secs: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_size: 2 * 1024 * 1024, // 2MB
            request_timeout_secs: 30,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
