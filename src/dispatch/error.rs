//! Request-scoped validation failures.

use thiserror::Error;

/// Why a routed delivery was rejected.
///
/// Every variant is answered with `400` and `{"error": <Display>}`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WebhookError {
    /// A required header is absent or empty.
    #[error("No {header} found on request")]
    MissingHeader { header: &'static str },

    /// The endpoint's allow-list rejects this event name.
    #[error("{header} is not acceptable")]
    EventNotAcceptable { header: &'static str, event: String },

    /// The body stream failed or exceeded the size limit.
    #[error("{0}")]
    BodyRead(String),

    /// The claimed signature does not match the body.
    #[error("{header} does not match blob signature")]
    SignatureMismatch { header: &'static str },

    /// The body is not valid JSON.
    #[error("{0}")]
    PayloadParse(String),
}

impl WebhookError {
    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            WebhookError::MissingHeader { .. } => "missing_header",
            WebhookError::EventNotAcceptable { .. } => "event_not_acceptable",
            WebhookError::BodyRead(_) => "body_read",
            WebhookError::SignatureMismatch { .. } => "signature_mismatch",
            WebhookError::PayloadParse(_) => "payload_parse",
        }
    }
}
