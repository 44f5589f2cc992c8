//! PostgreSQL role store.
//!
//! Grants live in a single `user_roles` table with a unique constraint on
//! `(user_id, role)`. Writes are `INSERT ... ON CONFLICT DO NOTHING`, so two
//! callers racing to grant the same pair both succeed and exactly one row
//! exists afterwards.
//!
//! Feature-gated behind `postgres-backend`. Uses `sqlx` with the Tokio
//! runtime for fully async operations.

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::{Role, RoleStore, StorageError, SubjectId};

/// A role store backed by PostgreSQL.
///
/// Thread-safe via `PgPool` (connection pool).
///
/// # Examples
///
/// ```no_run
/// # use rolegate_storage::PostgresRoleStore;
/// # #[tokio::main]
/// # async fn main() {
/// let store = PostgresRoleStore::connect("postgres://localhost/rolegate").await.unwrap();
/// # }
/// ```
#[derive(Clone)]
pub struct PostgresRoleStore {
    pool: PgPool,
}

impl std::fmt::Debug for PostgresRoleStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostgresRoleStore")
            .field("pool", &"[PgPool]")
            .finish_non_exhaustive()
    }
}

impl PostgresRoleStore {
    /// Connect to PostgreSQL and create the `user_roles` table if needed.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Open`] if the connection or migration fails.
    /// The database URL is never included in the error.
    pub async fn connect(database_url: &str) -> Result<Self, StorageError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .map_err(|e| StorageError::Open {
                reason: e.to_string(),
            })?;

        Self::from_pool(pool).await
    }

    /// Wrap an existing pool and run the migration.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Open`] if the migration fails.
    pub async fn from_pool(pool: PgPool) -> Result<Self, StorageError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS user_roles (\
                id         UUID        PRIMARY KEY DEFAULT gen_random_uuid(), \
                user_id    TEXT        NOT NULL, \
                role       TEXT        NOT NULL CHECK (role IN ('admin', 'editor')), \
                created_at TIMESTAMPTZ NOT NULL DEFAULT now(), \
                UNIQUE (user_id, role)\
            )",
        )
        .execute(&pool)
        .await
        .map_err(|e| StorageError::Open {
            reason: format!("migration failed: {e}"),
        })?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_user_roles_role ON user_roles (role)")
            .execute(&pool)
            .await
            .map_err(|e| StorageError::Open {
                reason: format!("index creation failed: {e}"),
            })?;

        Ok(Self { pool })
    }
}

#[async_trait::async_trait]
impl RoleStore for PostgresRoleStore {
    async fn count_role(&self, role: Role) -> Result<u64, StorageError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM user_roles WHERE role = $1")
            .bind(role.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StorageError::Read {
                reason: e.to_string(),
            })?;

        u64::try_from(count).map_err(|_| StorageError::Read {
            reason: format!("negative row count {count}"),
        })
    }

    async fn has_role(&self, subject: &SubjectId, role: Role) -> Result<bool, StorageError> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM user_roles WHERE user_id = $1 AND role = $2)",
        )
        .bind(subject.as_str())
        .bind(role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| StorageError::Read {
            reason: e.to_string(),
        })?;

        Ok(exists)
    }

    async fn upsert_role(&self, subject: &SubjectId, role: Role) -> Result<bool, StorageError> {
        let result = sqlx::query(
            "INSERT INTO user_roles (user_id, role) VALUES ($1, $2) \
             ON CONFLICT (user_id, role) DO NOTHING",
        )
        .bind(subject.as_str())
        .bind(role.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Write {
            subject: subject.to_string(),
            reason: e.to_string(),
        })?;

        let inserted = result.rows_affected() == 1;
        tracing::debug!(subject = %subject, role = %role, inserted, "role grant upserted");
        Ok(inserted)
    }
}
