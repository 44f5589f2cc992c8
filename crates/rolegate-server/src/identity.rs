//! HTTP identity provider.
//!
//! Exchanges a caller's bearer token for their subject identifier by asking
//! the hosted auth service who the token belongs to:
//!
//! ```text
//! GET {auth_url}/auth/v1/user
//! Authorization: Bearer <token>
//! apikey: <public api key>
//!
//! 200 {"id": "<subject>", ...}
//! ```
//!
//! Client-error statuses mean the token is bad. Anything else (timeouts,
//! 5xx, a body without an `id`) means the provider is unavailable, which the
//! caller treats as an internal error. Either way the request is denied.

use reqwest::StatusCode;
use rolegate_core::{IdentityError, IdentityProvider};
use rolegate_storage::SubjectId;
use serde::Deserialize;

use crate::config::IdentityConfig;

/// The subset of the provider's user object we read.
#[derive(Debug, Deserialize)]
struct UserResponse {
    #[serde(default)]
    id: String,
}

/// [`IdentityProvider`] backed by a remote auth service over HTTPS.
#[derive(Clone)]
pub struct HttpIdentityProvider {
    http: reqwest::Client,
    user_url: String,
    api_key: String,
}

impl std::fmt::Debug for HttpIdentityProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpIdentityProvider")
            .field("user_url", &self.user_url)
            .finish_non_exhaustive()
    }
}

impl HttpIdentityProvider {
    /// Build a provider client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: &IdentityConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            http,
            user_url: format!("{}/auth/v1/user", config.auth_url.trim_end_matches('/')),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait::async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn exchange_token(&self, bearer: &str) -> Result<SubjectId, IdentityError> {
        let mut request = self.http.get(&self.user_url).bearer_auth(bearer);
        if !self.api_key.is_empty() {
            request = request.header("apikey", &self.api_key);
        }

        let resp = request.send().await.map_err(|e| IdentityError::Unavailable {
            reason: format!("user lookup failed: {e}"),
        })?;

        match resp.status() {
            status if status.is_success() => {
                let user: UserResponse =
                    resp.json().await.map_err(|e| IdentityError::Unavailable {
                        reason: format!("failed to parse user response: {e}"),
                    })?;
                SubjectId::parse(&user.id).ok_or_else(|| IdentityError::Unavailable {
                    reason: "user response carried no id".to_owned(),
                })
            }
            StatusCode::BAD_REQUEST
            | StatusCode::UNAUTHORIZED
            | StatusCode::FORBIDDEN
            | StatusCode::NOT_FOUND
            | StatusCode::UNPROCESSABLE_ENTITY => {
                tracing::debug!(status = %resp.status(), "identity provider rejected token");
                Err(IdentityError::InvalidCredential)
            }
            status => Err(IdentityError::Unavailable {
                reason: format!("identity provider returned {status}"),
            }),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use axum::Json;
    use axum::http::{HeaderMap, StatusCode as AxumStatus};
    use axum::response::IntoResponse;
    use axum::routing::get;

    use super::*;

    /// Fake provider: `good` with the right apikey → alice, `broken` → 503,
    /// `empty` → 200 without id, anything else → 401.
    async fn user(headers: HeaderMap) -> axum::response::Response {
        let token = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .unwrap_or_default();
        let has_key = headers.get("apikey").is_some_and(|v| v == "anon");

        match token {
            "good" if has_key => Json(serde_json::json!({ "id": "alice", "email": "a@x" })).into_response(),
            "broken" => AxumStatus::SERVICE_UNAVAILABLE.into_response(),
            "empty" => Json(serde_json::json!({ "email": "a@x" })).into_response(),
            _ => (AxumStatus::UNAUTHORIZED, Json(serde_json::json!({ "msg": "bad jwt" }))).into_response(),
        }
    }

    async fn spawn_provider() -> String {
        let app = axum::Router::new().route("/auth/v1/user", get(user));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/")
    }

    fn provider(auth_url: String) -> HttpIdentityProvider {
        HttpIdentityProvider::new(&IdentityConfig {
            auth_url,
            api_key: "anon".to_owned(),
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn valid_token_yields_subject() {
        let provider = provider(spawn_provider().await);
        let subject = provider.exchange_token("good").await.unwrap();
        assert_eq!(subject.as_str(), "alice");
    }

    #[tokio::test]
    async fn rejected_token_is_invalid_credential() {
        let provider = provider(spawn_provider().await);
        let err = provider.exchange_token("expired").await.unwrap_err();
        assert!(matches!(err, IdentityError::InvalidCredential));
    }

    #[tokio::test]
    async fn missing_api_key_is_rejected_by_provider() {
        let mut provider = provider(spawn_provider().await);
        provider.api_key.clear();
        let err = provider.exchange_token("good").await.unwrap_err();
        assert!(matches!(err, IdentityError::InvalidCredential));
    }

    #[tokio::test]
    async fn server_error_is_unavailable() {
        let provider = provider(spawn_provider().await);
        let err = provider.exchange_token("broken").await.unwrap_err();
        assert!(matches!(err, IdentityError::Unavailable { .. }));
    }

    #[tokio::test]
    async fn response_without_id_is_unavailable() {
        let provider = provider(spawn_provider().await);
        let err = provider.exchange_token("empty").await.unwrap_err();
        assert!(matches!(err, IdentityError::Unavailable { .. }));
    }

    #[tokio::test]
    async fn unreachable_provider_is_unavailable() {
        // Bind then drop to get a port nothing listens on.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let provider = provider(format!("http://{addr}"));
        let err = provider.exchange_token("good").await.unwrap_err();
        assert!(matches!(err, IdentityError::Unavailable { .. }));
    }
}
