//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (url, path)
//!     → router.rs (endpoint lookup by exact url)
//!     → matcher.rs (event-name allow-list)
//!     → Return: resolved Endpoint (never "no endpoint")
//!
//! Route Compilation (at startup):
//!     EndpointConfig | EndpointConfig[]
//!     → Validate path/secret
//!     → Compile event filters
//!     → Freeze as immutable Router
//! ```
//!
//! # Design Decisions
//! - Endpoints compiled at startup, immutable at runtime
//! - Exact string equality only: no normalization, no trailing-slash tolerance
//! - Last registered match wins; no match falls back to the first endpoint
//! - A single configured endpoint is resolved for every url

pub mod matcher;
pub mod router;

pub use matcher::{accepts, EventFilter, WILDCARD};
pub use router::{Endpoint, Endpoints, Router};
