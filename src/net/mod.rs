//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! listener.tls configured?
//!     → tls.rs (load PEM cert + key into rustls)
//!     → axum-server TLS acceptor
//! otherwise
//!     → plain tokio TcpListener
//!     → Hand off to HTTP layer
//! ```

pub mod tls;
