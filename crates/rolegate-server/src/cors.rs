//! CORS origin policy.
//!
//! Browsers may call the endpoint from loopback origins (any port) and from
//! origins on the configured allowlist. Allowlist entries are either exact
//! origins (`https://example.com`) or subdomain wildcards
//! (`https://*.example.app`). Any other origin gets no
//! `Access-Control-Allow-Origin` header and the browser blocks the response.

use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue, Method, header};
use tower_http::cors::{AllowOrigin, CorsLayer};

/// Request headers the front-end is allowed to send.
pub const ALLOWED_HEADERS: &str = "authorization, x-client-info, apikey, content-type";

/// Decides which browser origins may read responses.
#[derive(Debug, Clone, Default)]
pub struct OriginPolicy {
    exact: Vec<String>,
    /// `(scheme, ".suffix")` pairs from `scheme://*.suffix` entries.
    wildcard: Vec<(String, String)>,
}

impl OriginPolicy {
    /// Build a policy from allowlist entries.
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut policy = Self::default();
        for entry in entries {
            let entry = entry.as_ref().trim().trim_end_matches('/').to_ascii_lowercase();
            if entry.is_empty() {
                continue;
            }
            match entry.split_once("://*.") {
                Some((scheme, suffix)) if !suffix.is_empty() => {
                    policy.wildcard.push((scheme.to_owned(), format!(".{suffix}")));
                }
                _ => policy.exact.push(entry),
            }
        }
        policy
    }

    /// Whether `origin` (the raw `Origin` header value) is allowed.
    #[must_use]
    pub fn allows(&self, origin: &str) -> bool {
        let origin = origin.trim().to_ascii_lowercase();
        let Some((scheme, authority)) = origin.split_once("://") else {
            return false;
        };
        if !matches!(scheme, "http" | "https") || authority.is_empty() || authority.contains('/') {
            return false;
        }

        let host = host_of(authority);
        if matches!(host, "localhost" | "127.0.0.1" | "[::1]") {
            return true;
        }

        if self.exact.iter().any(|allowed| *allowed == origin) {
            return true;
        }

        self.wildcard
            .iter()
            .any(|(s, suffix)| s == scheme && host.ends_with(suffix.as_str()))
    }

    /// Build the `tower-http` CORS layer enforcing this policy.
    #[must_use]
    pub fn into_layer(self) -> CorsLayer {
        let policy = Arc::new(self);
        CorsLayer::new()
            .allow_origin(AllowOrigin::predicate(move |origin: &HeaderValue, _| {
                origin.to_str().is_ok_and(|o| policy.allows(o))
            }))
            .allow_methods([Method::POST, Method::OPTIONS])
            .allow_headers([
                header::AUTHORIZATION,
                header::CONTENT_TYPE,
                HeaderName::from_static("x-client-info"),
                HeaderName::from_static("apikey"),
            ])
    }
}

/// Strip the port from an authority, keeping IPv6 brackets.
fn host_of(authority: &str) -> &str {
    if authority.starts_with('[') {
        match authority.find(']') {
            Some(end) => &authority[..=end],
            None => authority,
        }
    } else {
        authority.split(':').next().unwrap_or(authority)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> OriginPolicy {
        OriginPolicy::new(["https://crossangle.com/", "https://*.lovable.app", " "])
    }

    #[test]
    fn loopback_is_always_allowed() {
        let policy = OriginPolicy::default();
        assert!(policy.allows("http://localhost:5173"));
        assert!(policy.allows("http://localhost"));
        assert!(policy.allows("https://127.0.0.1:8080"));
        assert!(policy.allows("http://[::1]:3000"));
    }

    #[test]
    fn exact_origins_match_whole_origin() {
        let policy = policy();
        assert!(policy.allows("https://crossangle.com"));
        assert!(policy.allows("HTTPS://CrossAngle.com"));
        assert!(!policy.allows("http://crossangle.com"));
        assert!(!policy.allows("https://crossangle.com:8443"));
        assert!(!policy.allows("https://evil-crossangle.com"));
    }

    #[test]
    fn wildcard_matches_subdomains_only() {
        let policy = policy();
        assert!(policy.allows("https://preview-123.lovable.app"));
        assert!(policy.allows("https://a.b.lovable.app"));
        assert!(!policy.allows("https://lovable.app"));
        assert!(!policy.allows("https://evil-lovable.app"));
        assert!(!policy.allows("http://preview.lovable.app"));
    }

    #[test]
    fn malformed_origins_are_rejected() {
        let policy = policy();
        for origin in ["", "null", "localhost", "ftp://localhost", "https://", "https://crossangle.com/path"] {
            assert!(!policy.allows(origin), "{origin}");
        }
    }

    #[test]
    fn host_strips_port() {
        assert_eq!(host_of("example.com:443"), "example.com");
        assert_eq!(host_of("[::1]:80"), "[::1]");
        assert_eq!(host_of("example.com"), "example.com");
    }
}
