//! Role store abstraction for `rolegate`.
//!
//! This crate defines the [`RoleStore`] trait — the only persistence surface
//! the bootstrap service touches. A store holds `(subject, role)` grants and
//! answers three questions: how many subjects hold a role, whether a given
//! subject holds it, and "record this grant unless it already exists".
//!
//! Two implementations are provided:
//!
//! - [`PostgresRoleStore`] — production backend over a `user_roles` table (feature `postgres-backend`)
//! - [`MemoryRoleStore`] — in-memory, for tests and local development

mod error;
mod memory;
#[cfg(feature = "postgres-backend")]
mod postgres_backend;
mod role;

pub use error::StorageError;
pub use memory::MemoryRoleStore;
#[cfg(feature = "postgres-backend")]
pub use postgres_backend::PostgresRoleStore;
pub use role::{Role, RoleGrant, SubjectId};

/// A pluggable store of role grants.
///
/// Grants are keyed by the `(subject, role)` pair and that key is unique:
/// [`upsert_role`](RoleStore::upsert_role) must behave as an insert-if-absent
/// so that concurrent writers of the same pair can never produce duplicates
/// or errors.
///
/// Implementations must be safe to share across async tasks (`Send + Sync`).
#[async_trait::async_trait]
pub trait RoleStore: Send + Sync + 'static {
    /// Count the subjects currently holding `role`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Read`] if the underlying backend fails.
    async fn count_role(&self, role: Role) -> Result<u64, StorageError>;

    /// Check whether `subject` holds `role`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Read`] if the underlying backend fails.
    async fn has_role(&self, subject: &SubjectId, role: Role) -> Result<bool, StorageError>;

    /// Record a grant of `role` to `subject` unless it already exists.
    ///
    /// Returns `true` if a new grant was written and `false` if the pair was
    /// already present. Re-granting is never an error.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Write`] if the underlying backend fails.
    async fn upsert_role(&self, subject: &SubjectId, role: Role) -> Result<bool, StorageError>;

    /// Count existing administrators.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Read`] if the underlying backend fails.
    async fn count_admins(&self) -> Result<u64, StorageError> {
        self.count_role(Role::Admin).await
    }

    /// Check whether `subject` is an administrator.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Read`] if the underlying backend fails.
    async fn has_admin_role(&self, subject: &SubjectId) -> Result<bool, StorageError> {
        self.has_role(subject, Role::Admin).await
    }
}
