//! Delivery validation and dispatch.
//!
//! # Data Flow
//! ```text
//! Request<Body>
//!     → routing (resolve endpoint by url; path/method check → NotHandled)
//!     → signing::Provider::select (strategy from headers / user agent)
//!     → headers: signature, event name, delivery id (in that order)
//!     → event allow-list
//!     → collect body (bounded)
//!     → verify signature over the raw bytes
//!     → parse JSON
//!     → write 200 {"ok":true} → publish "<event>" then "*"
//!
//! Any step failing:
//!     → write 400 {"error": ...} → publish "error" → DispatchOutcome::Failed
//! ```
//!
//! # Design Decisions
//! - One async call per request, so each request resolves exactly once
//! - Response is written before listeners run, on both paths
//! - No retries; a rejected delivery is the sender's problem

pub mod error;
pub mod handler;

pub use error::WebhookError;
pub use handler::{DispatchOutcome, WebhookHandler};
