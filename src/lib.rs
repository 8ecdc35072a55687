//! Signed webhook receiver library

pub mod config;
pub mod dispatch;
pub mod events;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod routing;
pub mod signing;

pub use config::schema::{EndpointConfig, ReceiverConfig};
pub use dispatch::{DispatchOutcome, WebhookError, WebhookHandler};
pub use events::{EventEmitter, Message, WebhookEvent, WebhookFailure};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use signing::Provider;
