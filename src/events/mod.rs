//! Event publication subsystem.
//!
//! # Data Flow
//! ```text
//! Verified delivery
//!     → types.rs (WebhookEvent, shared as Arc)
//!     → emitter.rs: "<event name>" channel, then "*"
//!
//! Rejected delivery
//!     → types.rs (WebhookFailure: error + request head)
//!     → emitter.rs: "error" channel
//! ```

pub mod emitter;
pub mod types;

pub use emitter::{EventEmitter, Listener, Message, SubscriptionId, ERROR_CHANNEL};
pub use types::{RequestHead, WebhookEvent, WebhookFailure};
