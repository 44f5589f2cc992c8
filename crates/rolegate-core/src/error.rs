//! Error types for `rolegate-core`.
//!
//! Variants describe *why* a request was refused. The HTTP layer collapses
//! them into generic messages; the detail here is for server-side logs only.

use rolegate_storage::StorageError;

/// Errors from exchanging a bearer credential for a subject.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    /// The credential is missing, malformed, expired, or rejected.
    #[error("invalid credential")]
    InvalidCredential,

    /// The identity provider could not be reached or answered unexpectedly.
    #[error("identity provider unavailable: {reason}")]
    Unavailable { reason: String },
}

/// Errors from the bootstrap policy.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    /// No usable bearer credential was presented.
    #[error("unauthorized")]
    Unauthorized,

    /// The request did not name a target subject.
    #[error("missing user_id")]
    MissingUserId,

    /// The caller is authenticated but not entitled to this grant.
    #[error("forbidden: {reason}")]
    Forbidden { reason: String },

    /// The identity provider failed for reasons other than a bad credential.
    #[error("identity error: {0}")]
    Identity(IdentityError),

    /// The role store failed.
    #[error("role store error: {0}")]
    Store(#[from] StorageError),
}

impl From<IdentityError> for BootstrapError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::InvalidCredential => Self::Unauthorized,
            IdentityError::Unavailable { .. } => Self::Identity(err),
        }
    }
}
