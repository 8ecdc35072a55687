//! Shared utilities for dispatch and server tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{Request, StatusCode};

use hookrelay::http::ResponseWriter;
use hookrelay::signing;

pub const SECRET: &str = "bogus";
pub const DELIVERY_ID: &str = "72d3162e-cc78-11e3-81ab-4c9367dc0958";
pub const GITHUB_BODY: &str = r#"{"some":"github","object":"with","properties":true}"#;

/// A POST the way GitHub would send it, signed with [`SECRET`].
pub fn signed_post(uri: &str, event: &str, body: &str) -> Request<Body> {
    let signature = signing::sign(SECRET.as_bytes(), body.as_bytes());
    post(
        uri,
        &[
            ("x-hub-signature", signature.as_str()),
            ("x-github-event", event),
            ("x-github-delivery", DELIVERY_ID),
        ],
        Body::from(body.to_string()),
    )
}

/// A POST with exactly the given headers.
pub fn post(uri: &str, headers: &[(&str, &str)], body: Body) -> Request<Body> {
    request("POST", uri, headers, body)
}

pub fn request(method: &str, uri: &str, headers: &[(&str, &str)], body: Body) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("host", "hooks.example.com")
        .header("content-type", "application/json");
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    builder.body(body).unwrap()
}

/// Response writer that keeps every write and, optionally, notes it in a
/// shared timeline.
#[derive(Default)]
pub struct RecordingWriter {
    pub writes: Vec<(StatusCode, &'static str, String)>,
    timeline: Option<Arc<Mutex<Vec<&'static str>>>>,
}

impl RecordingWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeline(timeline: Arc<Mutex<Vec<&'static str>>>) -> Self {
        Self {
            writes: Vec::new(),
            timeline: Some(timeline),
        }
    }

    pub fn single(&self) -> &(StatusCode, &'static str, String) {
        assert_eq!(self.writes.len(), 1, "expected exactly one write");
        &self.writes[0]
    }
}

impl ResponseWriter for RecordingWriter {
    fn write(&mut self, status: StatusCode, content_type: &'static str, body: String) {
        if let Some(timeline) = &self.timeline {
            timeline.lock().unwrap().push("write");
        }
        self.writes.push((status, content_type, body));
    }
}

/// Counts invocations from inside a listener.
pub fn counter() -> (Arc<Mutex<usize>>, impl Fn() + Send + Sync + 'static) {
    let count = Arc::new(Mutex::new(0));
    let handle = count.clone();
    (count, move || *handle.lock().unwrap() += 1)
}
