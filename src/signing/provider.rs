//! Per-host verification strategies.
//!
//! Every supported source-control host signs its callbacks differently and
//! names its headers differently. A [`Provider`] bundles both facts so the
//! dispatcher can pick one strategy per request and then treat all hosts
//! the same way.

use std::fmt;
use std::str::FromStr;

use axum::http::{header, HeaderMap};
use serde::{Deserialize, Serialize};

use crate::signing::signature;

/// A source-control host whose webhooks we know how to authenticate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// `X-Hub-Signature: sha1=<hex hmac-sha1>`.
    GitHub,
    /// `X-Gitea-Signature: <hex hmac-sha256>`.
    Gitea,
    /// `X-Gogs-Signature: <hex hmac-sha256>`.
    Gogs,
    /// `X-Gitlab-Token: <shared secret>`.
    GitLab,
}

/// Header names a provider uses, in lookup form and display form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderSet {
    pub signature: &'static str,
    pub event: &'static str,
    pub delivery: &'static str,
    pub signature_display: &'static str,
    pub event_display: &'static str,
    pub delivery_display: &'static str,
}

const GITHUB_HEADERS: HeaderSet = HeaderSet {
    signature: "x-hub-signature",
    event: "x-github-event",
    delivery: "x-github-delivery",
    signature_display: "X-Hub-Signature",
    event_display: "X-Github-Event",
    delivery_display: "X-Github-Delivery",
};

const GITEA_HEADERS: HeaderSet = HeaderSet {
    signature: "x-gitea-signature",
    event: "x-gitea-event",
    delivery: "x-gitea-delivery",
    signature_display: "X-Gitea-Signature",
    event_display: "X-Gitea-Event",
    delivery_display: "X-Gitea-Delivery",
};

const GOGS_HEADERS: HeaderSet = HeaderSet {
    signature: "x-gogs-signature",
    event: "x-gogs-event",
    delivery: "x-gogs-delivery",
    signature_display: "X-Gogs-Signature",
    event_display: "X-Gogs-Event",
    delivery_display: "X-Gogs-Delivery",
};

const GITLAB_HEADERS: HeaderSet = HeaderSet {
    signature: "x-gitlab-token",
    event: "x-gitlab-event",
    delivery: "x-gitlab-event-uuid",
    signature_display: "X-Gitlab-Token",
    event_display: "X-Gitlab-Event",
    delivery_display: "X-Gitlab-Event-UUID",
};

impl Provider {
    /// Guess the sending host from request headers.
    ///
    /// Gitea also sends `X-Gogs-Event` and `X-GitHub-Event` for
    /// compatibility, so the more specific headers are checked first.
    pub fn detect(headers: &HeaderMap) -> Option<Provider> {
        let user_agent = headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();

        if user_agent.starts_with("GitHub-Hookshot") {
            Some(Provider::GitHub)
        } else if headers.contains_key("x-gitlab-event") || headers.contains_key("x-gitlab-token") {
            Some(Provider::GitLab)
        } else if headers.contains_key("x-gitea-event") {
            Some(Provider::Gitea)
        } else if headers.contains_key("x-gogs-event") {
            Some(Provider::Gogs)
        } else if headers.contains_key("x-github-event") {
            Some(Provider::GitHub)
        } else {
            None
        }
    }

    /// Strategy for a request: the pinned provider if any, else detection,
    /// else GitHub.
    pub fn select(pinned: Option<Provider>, headers: &HeaderMap) -> Provider {
        pinned
            .or_else(|| Provider::detect(headers))
            .unwrap_or(Provider::GitHub)
    }

    pub fn headers(self) -> &'static HeaderSet {
        match self {
            Provider::GitHub => &GITHUB_HEADERS,
            Provider::Gitea => &GITEA_HEADERS,
            Provider::Gogs => &GOGS_HEADERS,
            Provider::GitLab => &GITLAB_HEADERS,
        }
    }

    /// Compute the value this provider would put in its signature header.
    pub fn sign(self, secret: &[u8], blob: &[u8]) -> String {
        match self {
            Provider::GitHub => signature::sign(secret, blob),
            Provider::Gitea | Provider::Gogs => signature::sign_sha256_hex(secret, blob),
            Provider::GitLab => String::from_utf8_lossy(secret).into_owned(),
        }
    }

    /// Verify a claimed signature header value against the raw body.
    pub fn verify(self, secret: &[u8], claimed: &str, blob: &[u8]) -> bool {
        match self {
            Provider::GitHub => signature::verify(secret, claimed, blob),
            Provider::Gitea | Provider::Gogs => signature::verify_sha256_hex(secret, claimed, blob),
            Provider::GitLab => signature::verify_token(secret, claimed),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Provider::GitHub => "github",
            Provider::Gitea => "gitea",
            Provider::Gogs => "gogs",
            Provider::GitLab => "gitlab",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "github" => Ok(Provider::GitHub),
            "gitea" => Ok(Provider::Gitea),
            "gogs" => Ok(Provider::Gogs),
            "gitlab" => Ok(Provider::GitLab),
            other => Err(format!(
                "unknown provider '{other}' (expected github, gitea, gogs or gitlab)"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn test_detect_by_user_agent() {
        let map = headers(&[("user-agent", "GitHub-Hookshot/044aadd")]);
        assert_eq!(Provider::detect(&map), Some(Provider::GitHub));
    }

    #[test]
    fn test_detect_gitea_before_compat_headers() {
        let map = headers(&[
            ("x-gitea-event", "push"),
            ("x-gogs-event", "push"),
            ("x-github-event", "push"),
        ]);
        assert_eq!(Provider::detect(&map), Some(Provider::Gitea));
    }

    #[test]
    fn test_detect_others() {
        assert_eq!(
            Provider::detect(&headers(&[("x-gitlab-event", "Push Hook")])),
            Some(Provider::GitLab)
        );
        assert_eq!(
            Provider::detect(&headers(&[("x-gogs-event", "push")])),
            Some(Provider::Gogs)
        );
        assert_eq!(
            Provider::detect(&headers(&[("x-github-event", "push")])),
            Some(Provider::GitHub)
        );
        assert_eq!(Provider::detect(&HeaderMap::new()), None);
    }

    #[test]
    fn test_select_prefers_pinned() {
        let map = headers(&[("x-gitlab-event", "Push Hook")]);
        assert_eq!(Provider::select(Some(Provider::Gogs), &map), Provider::Gogs);
        assert_eq!(Provider::select(None, &map), Provider::GitLab);
        assert_eq!(Provider::select(None, &HeaderMap::new()), Provider::GitHub);
    }

    #[test]
    fn test_sign_then_verify_per_provider() {
        let blob = br#"{"ref":"refs/heads/main"}"#;
        for provider in [Provider::GitHub, Provider::Gitea, Provider::Gogs, Provider::GitLab] {
            let claimed = provider.sign(b"bogus", blob);
            assert!(provider.verify(b"bogus", &claimed, blob), "{provider}");
            assert!(!provider.verify(b"other", &claimed, blob), "{provider}");
        }
    }

    #[test]
    fn test_provider_deserializes_lowercase() {
        let parsed: Provider = serde_json::from_str("\"gitlab\"").unwrap();
        assert_eq!(parsed, Provider::GitLab);
        assert_eq!(Provider::GitHub.to_string(), "github");
        assert_eq!("GitLab".parse::<Provider>(), Ok(Provider::GitLab));
        assert!("gitee".parse::<Provider>().is_err());
    }
}
