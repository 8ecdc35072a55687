//! Response writing for webhook deliveries.
//!
//! # Responsibilities
//! - Define where the dispatcher writes its answer ([`ResponseWriter`])
//! - Produce the exact success and error bodies
//! - Convert a buffered answer into an axum response
//!
//! # Design Decisions
//! - The dispatcher writes the response before publishing anything
//! - Error messages are JSON-escaped through serde_json, never formatted by hand

use axum::body::Body;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::Response;

pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Body sent for every accepted delivery.
pub const SUCCESS_BODY: &str = r#"{"ok":true}"#;

/// `{"error":"<message>"}` with the message escaped.
pub fn error_body(message: &str) -> String {
    serde_json::json!({ "error": message }).to_string()
}

/// Destination for the dispatcher's answer.
pub trait ResponseWriter {
    /// Write status, content type and full body in one go.
    fn write(&mut self, status: StatusCode, content_type: &'static str, body: String);
}

/// Holds a written answer until the server returns it.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BufferedResponse {
    written: Option<(StatusCode, &'static str, String)>,
}

impl BufferedResponse {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_written(&self) -> bool {
        self.written.is_some()
    }

    pub fn status(&self) -> Option<StatusCode> {
        self.written.as_ref().map(|(status, _, _)| *status)
    }

    pub fn content_type(&self) -> Option<&'static str> {
        self.written.as_ref().map(|(_, content_type, _)| *content_type)
    }

    pub fn body(&self) -> Option<&str> {
        self.written.as_ref().map(|(_, _, body)| body.as_str())
    }

    /// The written answer as an HTTP response, if anything was written.
    pub fn into_response(self) -> Option<Response> {
        let (status, content_type, body) = self.written?;
        let mut response = Response::new(Body::from(body));
        *response.status_mut() = status;
        response
            .headers_mut()
            .insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
        Some(response)
    }
}

impl ResponseWriter for BufferedResponse {
    fn write(&mut self, status: StatusCode, content_type: &'static str, body: String) {
        self.written = Some((status, content_type, body));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_body_escapes() {
        assert_eq!(
            error_body("X-Hub-Signature does not match blob signature"),
            r#"{"error":"X-Hub-Signature does not match blob signature"}"#
        );
        assert_eq!(error_body(r#"bad "quote""#), r#"{"error":"bad \"quote\""}"#);
    }

    #[test]
    fn test_buffered_response() {
        let mut res = BufferedResponse::new();
        assert!(!res.is_written());
        assert!(res.clone().into_response().is_none());

        res.write(StatusCode::OK, JSON_CONTENT_TYPE, SUCCESS_BODY.to_string());
        assert_eq!(res.status(), Some(StatusCode::OK));
        assert_eq!(res.body(), Some(SUCCESS_BODY));

        let response = res.into_response().unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], JSON_CONTENT_TYPE);
    }
}
