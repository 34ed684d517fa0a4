//! Postgres-backed identity and ownership store.
//!
//! Minimal schema this adapter reads:
//!
//! | Table | Columns |
//! |-------|---------|
//! | `users` | `id`, `username`, `token`, `is_active` |
//! | `user_roles` | `user_id` (unique), `role_id` |
//! | `role_permissions` | `role_id`, `permission_id` |
//! | `permissions` | `id`, `permission` |
//! | `exhibits` | `uuid`, `owner` |
//! | `items`, `headings`, `grids`, `grid_items`, `timelines`, `timeline_items` | `uuid`, `owner`, `is_member_of_exhibit` |
//!
//! A user has exactly one active role. `role_grants` reads a single
//! `user_roles` row (lowest `role_id`) even if the uniqueness constraint on
//! `user_roles.user_id` is missing.
//!
//! ## Error Mapping
//!
//! Every `sqlx::Error` becomes `StoreError::Backend` tagged with the operation
//! name. Rows that cannot be read into the expected shape are
//! `StoreError::Decode`. "Not found" is never an error.

use std::time::Duration;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::instrument;

use exhibits_auth::{IdentityStore, OwnershipStore, PermissionEntry, RoleGrant, StoreError, UserRecord};
use exhibits_core::{PermissionId, RecordId, RecordType, RoleId, UserId};

use crate::AppConfig;

/// Build a connection pool from configuration.
pub async fn connect(cfg: &AppConfig) -> Result<PgPool, StoreError> {
    PgPoolOptions::new()
        .max_connections(cfg.max_connections)
        .acquire_timeout(cfg.lookup_timeout().max(Duration::from_secs(1)))
        .connect(&cfg.database_url)
        .await
        .map_err(|e| map_sqlx_error("connect", e))
}

/// Reads users, grants, the permission catalog and record owners.
///
/// `Send + Sync`; clone freely, the pool is shared.
#[derive(Debug, Clone)]
pub struct PgAuthStore {
    pool: PgPool,
}

impl PgAuthStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// `SELECT 1` round trip.
    pub async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(|e| map_sqlx_error("health_check", e))
    }

    async fn find_user(&self, operation: &'static str, sql: &str, key: &str) -> Result<Option<UserRecord>, StoreError> {
        let row: Option<(i64, bool)> = sqlx::query_as(sql)
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(operation, e))?;

        Ok(row.map(|(id, is_active)| UserRecord { id, is_active }))
    }
}

const ROLE_GRANTS_SQL: &str = r#"
    SELECT rp.role_id::bigint, rp.permission_id::bigint
    FROM role_permissions rp
    WHERE rp.role_id = (
        SELECT ur.role_id
        FROM user_roles ur
        WHERE ur.user_id = $1
        ORDER BY ur.role_id
        LIMIT 1
    )
"#;

/// Child table for a record type. Table names never come from input.
fn child_table(record_type: RecordType) -> Option<&'static str> {
    match record_type {
        RecordType::Exhibit => None,
        RecordType::Item => Some("items"),
        RecordType::Heading => Some("headings"),
        RecordType::Grid => Some("grids"),
        RecordType::GridItem => Some("grid_items"),
        RecordType::Timeline => Some("timelines"),
        RecordType::TimelineItem => Some("timeline_items"),
    }
}

#[async_trait::async_trait]
impl IdentityStore for PgAuthStore {
    #[instrument(skip_all, err)]
    async fn find_user_by_token(&self, token: &str) -> Result<Option<UserRecord>, StoreError> {
        self.find_user(
            "find_user_by_token",
            r#"
            SELECT id::bigint, COALESCE(is_active, false)
            FROM users
            WHERE token = $1
            LIMIT 1
            "#,
            token,
        )
        .await
    }

    #[instrument(skip(self), err)]
    async fn find_user_by_username(&self, username: &str) -> Result<Option<UserRecord>, StoreError> {
        self.find_user(
            "find_user_by_username",
            r#"
            SELECT id::bigint, COALESCE(is_active, false)
            FROM users
            WHERE username = $1
            LIMIT 1
            "#,
            username,
        )
        .await
    }

    #[instrument(skip(self), fields(user_id = %user_id), err)]
    async fn role_grants(&self, user_id: UserId) -> Result<Vec<RoleGrant>, StoreError> {
        let rows: Vec<(i64, i64)> = sqlx::query_as(ROLE_GRANTS_SQL)
            .bind(user_id.get())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("role_grants", e))?;

        Ok(rows
            .into_iter()
            .map(|(role_id, permission_id)| RoleGrant::new(RoleId::new(role_id), PermissionId::new(permission_id)))
            .collect())
    }

    #[instrument(skip(self), err)]
    async fn permission_catalog(&self) -> Result<Vec<PermissionEntry>, StoreError> {
        let rows: Vec<(i64, Option<String>)> = sqlx::query_as("SELECT id::bigint, permission FROM permissions")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("permission_catalog", e))?;

        // NULL names become blank entries, which the catalog skips.
        Ok(rows
            .into_iter()
            .map(|(id, name)| PermissionEntry::new(id, name.unwrap_or_default()))
            .collect())
    }
}

#[async_trait::async_trait]
impl OwnershipStore for PgAuthStore {
    #[instrument(skip(self), fields(exhibit_id = %exhibit_id), err)]
    async fn exhibit_owner(&self, exhibit_id: RecordId) -> Result<Option<i64>, StoreError> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COALESCE(owner, 0)::bigint
            FROM exhibits
            WHERE uuid = $1
            "#,
        )
        .bind(exhibit_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("exhibit_owner", e))
    }

    #[instrument(skip(self), fields(record_type = %record_type, record_id = %record_id), err)]
    async fn record_owner(
        &self,
        record_type: RecordType,
        exhibit_id: RecordId,
        record_id: RecordId,
    ) -> Result<Option<i64>, StoreError> {
        // Exhibits have no parent; their owner comes from `exhibit_owner`.
        let Some(table) = child_table(record_type) else {
            return Ok(None);
        };

        let sql = format!(
            "SELECT COALESCE(owner, 0)::bigint FROM {table} WHERE uuid = $1 AND is_member_of_exhibit = $2"
        );

        sqlx::query_scalar::<_, i64>(&sql)
            .bind(record_id.as_uuid())
            .bind(exhibit_id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("record_owner", e))
    }
}

fn map_sqlx_error(operation: &'static str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let code = db_err.code().map(|c| c.into_owned()).unwrap_or_default();
            StoreError::backend(operation, format!("database error [{code}]: {}", db_err.message()))
        }
        sqlx::Error::PoolClosed => StoreError::backend(operation, "connection pool closed"),
        sqlx::Error::PoolTimedOut => StoreError::backend(operation, "timed out acquiring a connection"),
        sqlx::Error::ColumnDecode { index, source } => {
            StoreError::decode(operation, format!("column {index}: {source}"))
        }
        sqlx::Error::ColumnNotFound(column) => StoreError::decode(operation, format!("missing column {column}")),
        sqlx::Error::Decode(source) => StoreError::decode(operation, source.to_string()),
        other => StoreError::backend(operation, other.to_string()),
    }
}
