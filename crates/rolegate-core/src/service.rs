//! The first-admin bootstrap policy.
//!
//! A deployment moves through two states:
//!
//! ```text
//! NoAdmins ──(caller grants admin to themselves)──▶ HasAdmins
//! ```
//!
//! In `NoAdmins` a caller may grant the admin role only to their own
//! subject. In `HasAdmins` only an existing admin may grant it, to anyone.
//! There is no way back.
//!
//! The admin count and the write are not one transaction. Two callers racing
//! on an empty store can both pass the `NoAdmins` check and both become
//! admin. The store's unique `(subject, role)` key keeps that outcome clean:
//! no duplicate rows, no errors.

use std::sync::Arc;

use rolegate_storage::{Role, RoleStore, SubjectId};
use tracing::{info, warn};

use crate::error::BootstrapError;
use crate::identity::IdentityProvider;
use crate::request::{BootstrapRequest, BootstrapResponse};

/// Result of a successful admin grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOutcome {
    /// A new grant was written.
    Granted,
    /// The subject was already an admin; nothing changed.
    AlreadyGranted,
}

/// Stateless request handler for the admin bootstrap endpoint.
///
/// Cheap to clone; holds only shared handles to its collaborators.
#[derive(Clone)]
pub struct BootstrapService {
    identity: Arc<dyn IdentityProvider>,
    roles: Arc<dyn RoleStore>,
}

impl std::fmt::Debug for BootstrapService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BootstrapService").finish_non_exhaustive()
    }
}

impl BootstrapService {
    /// Create a service over the given identity provider and role store.
    #[must_use]
    pub fn new(identity: Arc<dyn IdentityProvider>, roles: Arc<dyn RoleStore>) -> Self {
        Self { identity, roles }
    }

    /// Dispatch a classified request.
    ///
    /// `bearer` is ignored for status checks.
    ///
    /// # Errors
    ///
    /// See [`signup_enabled`](Self::signup_enabled) and
    /// [`assign_admin`](Self::assign_admin).
    pub async fn handle(
        &self,
        bearer: Option<&str>,
        request: BootstrapRequest,
    ) -> Result<BootstrapResponse, BootstrapError> {
        match request {
            BootstrapRequest::StatusCheck => {
                let signup_enabled = self.signup_enabled().await?;
                Ok(BootstrapResponse::SignupStatus { signup_enabled })
            }
            BootstrapRequest::AssignAdmin { user_id } => {
                self.assign_admin(bearer, user_id).await?;
                Ok(BootstrapResponse::Assigned { ok: true })
            }
        }
    }

    /// Whether self-service first-admin signup is open: true iff no admin
    /// exists. Requires no authentication and never writes.
    ///
    /// # Errors
    ///
    /// Returns [`BootstrapError::Store`] if the admin count cannot be read.
    pub async fn signup_enabled(&self) -> Result<bool, BootstrapError> {
        let admin_count = self.roles.count_admins().await?;
        Ok(admin_count == 0)
    }

    /// Grant the admin role to `user_id` on behalf of the holder of `bearer`.
    ///
    /// Checks run in a fixed order and stop at the first failure:
    /// credential, target, admin count, then entitlement. The single write
    /// happens last.
    ///
    /// # Errors
    ///
    /// - [`BootstrapError::Unauthorized`] if `bearer` is absent or rejected
    /// - [`BootstrapError::MissingUserId`] if `user_id` is absent
    /// - [`BootstrapError::Forbidden`] if the caller may not make this grant
    /// - [`BootstrapError::Identity`] / [`BootstrapError::Store`] on
    ///   collaborator failure
    pub async fn assign_admin(
        &self,
        bearer: Option<&str>,
        user_id: Option<SubjectId>,
    ) -> Result<AssignOutcome, BootstrapError> {
        let bearer = bearer.ok_or(BootstrapError::Unauthorized)?;
        let caller = self.identity.exchange_token(bearer).await?;

        let target = user_id.ok_or(BootstrapError::MissingUserId)?;

        let admin_count = self.roles.count_admins().await?;

        if admin_count == 0 {
            if target != caller {
                warn!(
                    caller = %caller,
                    target = %target,
                    "bootstrap refused: first admin may only appoint themselves"
                );
                return Err(BootstrapError::Forbidden {
                    reason: "no admins exist and target is not the caller".to_owned(),
                });
            }
        } else if !self.roles.has_admin_role(&caller).await? {
            warn!(
                caller = %caller,
                target = %target,
                admin_count,
                "admin grant refused: caller is not an admin"
            );
            return Err(BootstrapError::Forbidden {
                reason: "caller is not an admin".to_owned(),
            });
        }

        let inserted = self.roles.upsert_role(&target, Role::Admin).await?;

        if inserted {
            if admin_count == 0 {
                info!(subject = %target, "first admin bootstrapped");
            } else {
                info!(caller = %caller, subject = %target, "admin role granted");
            }
            Ok(AssignOutcome::Granted)
        } else {
            info!(caller = %caller, subject = %target, "admin role already held");
            Ok(AssignOutcome::AlreadyGranted)
        }
    }
}
