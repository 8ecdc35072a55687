//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection
//!     → server.rs (Axum setup, request ID, timeout, listener protocol)
//!     → request.rs (url, header and host accessors)
//!     → [dispatch decides: ours or not handled]
//!     → response.rs (status + JSON body, written once)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{ListenerProtocol, RequestExt, X_REQUEST_ID};
pub use response::{BufferedResponse, ResponseWriter};
pub use server::HttpServer;
