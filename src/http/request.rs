//! Request inspection helpers.
//!
//! # Responsibilities
//! - Read the request url exactly as received (path + query)
//! - Extract header values the dispatcher depends on
//! - Carry the listener protocol (`http`/`https`) to the dispatcher
//!
//! # Design Decisions
//! - Request ID is set by tower-http as early as possible for tracing
//! - Empty or non-UTF-8 header values count as absent
//! - Requests are only read, never modified

use axum::http::{header, Request};

pub const X_REQUEST_ID: &str = "x-request-id";

/// Protocol of the listener that accepted the connection.
///
/// Inserted as a request extension by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerProtocol(pub &'static str);

/// Read-only accessors used while validating a delivery.
pub trait RequestExt {
    /// Path and query as received, e.g. `/webhook?x=1`.
    fn url(&self) -> String;

    /// A header value, if present, non-empty and valid UTF-8.
    fn header_str(&self, name: &str) -> Option<&str>;

    fn host(&self) -> Option<String>;

    /// `http`/`https` when the listener or the url says so.
    fn protocol(&self) -> Option<String>;

    fn request_id(&self) -> Option<&str>;
}

impl<B> RequestExt for Request<B> {
    fn url(&self) -> String {
        self.uri()
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| self.uri().path().to_string())
    }

    fn header_str(&self, name: &str) -> Option<&str> {
        self.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
    }

    fn host(&self) -> Option<String> {
        self.header_str(header::HOST.as_str())
            .map(str::to_string)
            .or_else(|| self.uri().authority().map(|a| a.to_string()))
    }

    fn protocol(&self) -> Option<String> {
        self.extensions()
            .get::<ListenerProtocol>()
            .map(|p| p.0.to_string())
            .or_else(|| self.uri().scheme_str().map(str::to_string))
    }

    fn request_id(&self) -> Option<&str> {
        self.header_str(X_REQUEST_ID)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[test]
    fn test_url_keeps_query() {
        let req = Request::builder()
            .uri("/some/url?test=param")
            .body(Body::empty())
            .unwrap();
        assert_eq!(req.url(), "/some/url?test=param");
        assert_eq!(req.uri().path(), "/some/url");
    }

    #[test]
    fn test_header_str_ignores_empty() {
        let req = Request::builder()
            .header("X-Github-Event", "")
            .header("x-github-delivery", "abc")
            .body(Body::empty())
            .unwrap();
        assert_eq!(req.header_str("x-github-event"), None);
        assert_eq!(req.header_str("x-github-delivery"), Some("abc"));
    }

    #[test]
    fn test_host_and_protocol() {
        let mut req = Request::builder()
            .uri("/")
            .header("Host", "hooks.example.com")
            .body(Body::empty())
            .unwrap();
        assert_eq!(req.host().as_deref(), Some("hooks.example.com"));
        assert_eq!(req.protocol(), None);

        req.extensions_mut().insert(ListenerProtocol("https"));
        assert_eq!(req.protocol().as_deref(), Some("https"));

        let absolute = Request::builder()
            .uri("http://example.com/hook")
            .body(Body::empty())
            .unwrap();
        assert_eq!(absolute.protocol().as_deref(), Some("http"));
        assert_eq!(absolute.host().as_deref(), Some("example.com"));
        assert_eq!(absolute.url(), "/hook");
    }
}
