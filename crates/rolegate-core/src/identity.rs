//! Identity provider port.
//!
//! The service never verifies credentials itself. It hands the bearer token
//! to an [`IdentityProvider`] and gets back the caller's [`SubjectId`].

use std::collections::HashMap;

use rolegate_storage::SubjectId;

use crate::error::IdentityError;

/// Exchanges a bearer credential for the subject it was issued to.
#[async_trait::async_trait]
pub trait IdentityProvider: Send + Sync + 'static {
    /// Verify `bearer` and return the caller's subject identifier.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::InvalidCredential`] if the provider rejects
    /// the token, or [`IdentityError::Unavailable`] if it cannot answer.
    async fn exchange_token(&self, bearer: &str) -> Result<SubjectId, IdentityError>;
}

/// A fixed token-to-subject table.
///
/// Useful for tests and local development where no real identity provider
/// is running. Unknown tokens are rejected as invalid credentials.
#[derive(Debug, Clone, Default)]
pub struct StaticIdentityProvider {
    tokens: HashMap<String, SubjectId>,
}

impl StaticIdentityProvider {
    /// Create an empty provider that rejects every token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `token` as a credential for `subject`.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>, subject: SubjectId) -> Self {
        self.tokens.insert(token.into(), subject);
        self
    }
}

#[async_trait::async_trait]
impl IdentityProvider for StaticIdentityProvider {
    async fn exchange_token(&self, bearer: &str) -> Result<SubjectId, IdentityError> {
        self.tokens
            .get(bearer)
            .cloned()
            .ok_or(IdentityError::InvalidCredential)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn known_token_resolves_subject() {
        let alice = SubjectId::parse("alice").unwrap();
        let provider = StaticIdentityProvider::new().with_token("tok-a", alice.clone());
        assert_eq!(provider.exchange_token("tok-a").await.unwrap(), alice);
    }

    #[tokio::test]
    async fn unknown_token_is_invalid() {
        let provider = StaticIdentityProvider::new();
        let err = provider.exchange_token("nope").await.unwrap_err();
        assert!(matches!(err, IdentityError::InvalidCredential));
    }
}
