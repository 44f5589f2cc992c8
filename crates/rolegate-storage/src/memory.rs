//! In-memory role store for testing.
//!
//! Grants live in a `BTreeMap` behind a `RwLock`. Nothing is persisted — all
//! grants are lost when the process exits. The write lock makes
//! [`upsert_role`](crate::RoleStore::upsert_role) atomic, which matches the
//! unique-key guarantee of the PostgreSQL backend.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;

use crate::{Role, RoleGrant, RoleStore, StorageError, SubjectId};

/// An in-memory role store keyed by `(subject, role)`.
///
/// Clones share the same underlying map.
///
/// # Examples
///
/// ```
/// # use rolegate_storage::{MemoryRoleStore, RoleStore, SubjectId};
/// # #[tokio::main]
/// # async fn main() {
/// let store = MemoryRoleStore::new();
/// let alice = SubjectId::parse("alice").unwrap();
/// assert!(store.upsert_role(&alice, rolegate_storage::Role::Admin).await.unwrap());
/// assert_eq!(store.count_admins().await.unwrap(), 1);
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryRoleStore {
    grants: Arc<RwLock<BTreeMap<(SubjectId, Role), RoleGrant>>>,
}

impl MemoryRoleStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot every grant, ordered by subject then role.
    pub async fn grants(&self) -> Vec<RoleGrant> {
        self.grants.read().await.values().cloned().collect()
    }
}

#[async_trait::async_trait]
impl RoleStore for MemoryRoleStore {
    async fn count_role(&self, role: Role) -> Result<u64, StorageError> {
        let grants = self.grants.read().await;
        let count = grants.keys().filter(|(_, r)| *r == role).count();
        Ok(count as u64)
    }

    async fn has_role(&self, subject: &SubjectId, role: Role) -> Result<bool, StorageError> {
        let grants = self.grants.read().await;
        Ok(grants.contains_key(&(subject.clone(), role)))
    }

    async fn upsert_role(&self, subject: &SubjectId, role: Role) -> Result<bool, StorageError> {
        let mut grants = self.grants.write().await;
        let key = (subject.clone(), role);
        if grants.contains_key(&key) {
            return Ok(false);
        }
        grants.insert(
            key,
            RoleGrant {
                subject: subject.clone(),
                role,
                granted_at: Utc::now(),
            },
        );
        Ok(true)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn subject(raw: &str) -> SubjectId {
        SubjectId::parse(raw).unwrap()
    }

    #[tokio::test]
    async fn empty_store_has_no_admins() {
        let store = MemoryRoleStore::new();
        assert_eq!(store.count_admins().await.unwrap(), 0);
        assert!(!store.has_admin_role(&subject("alice")).await.unwrap());
    }

    #[tokio::test]
    async fn upsert_then_lookup() {
        let store = MemoryRoleStore::new();
        assert!(store.upsert_role(&subject("alice"), Role::Admin).await.unwrap());
        assert!(store.has_admin_role(&subject("alice")).await.unwrap());
        assert!(!store.has_admin_role(&subject("bob")).await.unwrap());
    }

    #[tokio::test]
    async fn upsert_existing_pair_is_noop() {
        let store = MemoryRoleStore::new();
        assert!(store.upsert_role(&subject("alice"), Role::Admin).await.unwrap());
        assert!(!store.upsert_role(&subject("alice"), Role::Admin).await.unwrap());
        assert_eq!(store.grants().await.len(), 1);
        assert_eq!(store.count_admins().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn count_is_per_role() {
        let store = MemoryRoleStore::new();
        store.upsert_role(&subject("alice"), Role::Admin).await.unwrap();
        store.upsert_role(&subject("bob"), Role::Editor).await.unwrap();
        store.upsert_role(&subject("carol"), Role::Admin).await.unwrap();

        assert_eq!(store.count_role(Role::Admin).await.unwrap(), 2);
        assert_eq!(store.count_role(Role::Editor).await.unwrap(), 1);
        assert!(!store.has_admin_role(&subject("bob")).await.unwrap());
    }

    #[tokio::test]
    async fn same_subject_can_hold_two_roles() {
        let store = MemoryRoleStore::new();
        assert!(store.upsert_role(&subject("alice"), Role::Editor).await.unwrap());
        assert!(store.upsert_role(&subject("alice"), Role::Admin).await.unwrap());
        assert_eq!(store.grants().await.len(), 2);
    }

    #[tokio::test]
    async fn concurrent_upserts_of_same_pair_write_once() {
        let store = MemoryRoleStore::new();
        let mut handles = Vec::new();
        for _ in 0..16 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.upsert_role(&subject("alice"), Role::Admin).await.unwrap()
            }));
        }

        let mut inserted = 0;
        for handle in handles {
            if handle.await.unwrap() {
                inserted += 1;
            }
        }

        assert_eq!(inserted, 1);
        assert_eq!(store.count_admins().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn clone_shares_state() {
        let store = MemoryRoleStore::new();
        let clone = store.clone();
        store.upsert_role(&subject("alice"), Role::Admin).await.unwrap();
        assert!(clone.has_admin_role(&subject("alice")).await.unwrap());
    }
}
