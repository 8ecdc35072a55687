//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Every endpoint has a usable path and secret
//! - Validate value ranges (timeouts > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ReceiverConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::{EndpointConfig, ReceiverConfig};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("must provide at least one endpoint")]
    NoEndpoints,

    #[error("configure either `endpoint` or `endpoints`, not both")]
    AmbiguousEndpoints,

    #[error("endpoint {index}: must provide a 'path' option")]
    MissingPath { index: usize },

    #[error("endpoint {index}: path '{path}' must start with '/'")]
    RelativePath { index: usize, path: String },

    #[error("endpoint {index}: must provide a 'secret' option")]
    MissingSecret { index: usize },

    #[error("invalid bind address '{0}'")]
    InvalidBindAddress(String),

    #[error("invalid metrics address '{0}'")]
    InvalidMetricsAddress(String),

    #[error("max_body_size must be greater than zero")]
    ZeroBodyLimit,

    #[error("request_timeout_secs must be greater than zero")]
    ZeroTimeout,

    #[error("unknown log level '{0}'")]
    UnknownLogLevel(String),
}

/// Check endpoint definitions in registration order.
pub fn validate_endpoints(endpoints: &[EndpointConfig]) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if endpoints.is_empty() {
        errors.push(ValidationError::NoEndpoints);
    }

    for (index, endpoint) in endpoints.iter().enumerate() {
        if endpoint.path.is_empty() {
            errors.push(ValidationError::MissingPath { index });
        } else if !endpoint.path.starts_with('/') {
            errors.push(ValidationError::RelativePath {
                index,
                path: endpoint.path.clone(),
            });
        }

        if endpoint.secret.is_empty() {
            errors.push(ValidationError::MissingSecret { index });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Validate a whole configuration file.
pub fn validate_config(config: &ReceiverConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match (&config.endpoint, config.endpoints.is_empty()) {
        (Some(_), false) => errors.push(ValidationError::AmbiguousEndpoints),
        (Some(single), true) => {
            if let Err(found) = validate_endpoints(std::slice::from_ref(single)) {
                errors.extend(found);
            }
        }
        (None, _) => {
            if let Err(found) = validate_endpoints(&config.endpoints) {
                errors.extend(found);
            }
        }
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if config.limits.max_body_size == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    if config.limits.request_timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout);
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::UnknownLogLevel(
            config.observability.log_level.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
