//! Endpoint lookup.
//!
//! # Responsibilities
//! - Store compiled endpoints
//! - Pick the endpoint configuration for a request url
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(n) scan in registration order (endpoint counts are small)
//! - Always returns an endpoint; the dispatcher's exact path check turns a
//!   fallback into "not handled"

use axum::http::HeaderMap;

use crate::config::validation::validate_endpoints;
use crate::config::{ConfigError, EndpointConfig};
use crate::routing::matcher::EventFilter;
use crate::signing::Provider;

/// Endpoint definitions as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoints {
    /// One endpoint; it is resolved for every request url.
    Single(EndpointConfig),
    /// Several endpoints, selected by exact url.
    Many(Vec<EndpointConfig>),
}

impl From<EndpointConfig> for Endpoints {
    fn from(config: EndpointConfig) -> Self {
        Endpoints::Single(config)
    }
}

impl From<Vec<EndpointConfig>> for Endpoints {
    fn from(configs: Vec<EndpointConfig>) -> Self {
        Endpoints::Many(configs)
    }
}

/// A validated endpoint with its compiled event filter.
#[derive(Debug, Clone)]
pub struct Endpoint {
    pub config: EndpointConfig,
    pub filter: EventFilter,
}

impl Endpoint {
    fn compile(config: EndpointConfig) -> Self {
        let filter = EventFilter::from_config(config.events.as_ref());
        Self { config, filter }
    }

    pub fn path(&self) -> &str {
        &self.config.path
    }

    pub fn secret(&self) -> &[u8] {
        self.config.secret.as_bytes()
    }

    /// Verification strategy for a request arriving on this endpoint.
    pub fn provider_for(&self, headers: &HeaderMap) -> Provider {
        Provider::select(self.config.provider, headers)
    }
}

/// Immutable endpoint table.
#[derive(Debug, Clone)]
pub struct Router {
    endpoints: Vec<Endpoint>,
    single: bool,
}

impl Router {
    /// Validate and compile endpoints.
    ///
    /// Fails if there are no endpoints or any entry lacks a path or secret.
    pub fn new(endpoints: impl Into<Endpoints>) -> Result<Self, ConfigError> {
        let (configs, single) = match endpoints.into() {
            Endpoints::Single(config) => (vec![config], true),
            Endpoints::Many(configs) => (configs, false),
        };

        validate_endpoints(&configs)?;

        Ok(Self {
            endpoints: configs.into_iter().map(Endpoint::compile).collect(),
            single,
        })
    }

    /// Pick the endpoint for a request url (path plus any query string).
    pub fn resolve(&self, url: &str) -> &Endpoint {
        if self.single {
            return self.primary();
        }

        self.endpoints
            .iter()
            .rev()
            .find(|endpoint| endpoint.config.path == url)
            .unwrap_or_else(|| self.primary())
    }

    /// First registered endpoint.
    pub fn primary(&self) -> &Endpoint {
        // validate_endpoints rejects an empty list
        &self.endpoints[0]
    }

    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }

    pub fn is_single(&self) -> bool {
        self.single
    }
}
