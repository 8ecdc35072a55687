//! Signature subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request headers
//!     → provider.rs (pick verification strategy: GitHub, Gitea, Gogs, GitLab)
//!     → provider headers (signature, event name, delivery id)
//!
//! Raw body bytes + endpoint secret
//!     → signature.rs (HMAC over the exact bytes received)
//!     → constant-time comparison against the claimed value
//! ```
//!
//! # Design Decisions
//! - Always sign the raw blob, never a re-serialized payload
//! - Length mismatch short-circuits; equal-length comparison is constant-time
//! - Strategies are a closed enum selected once per request

pub mod provider;
pub mod signature;

pub use provider::{HeaderSet, Provider};
pub use signature::{sign, sign_sha256_hex, verify};
