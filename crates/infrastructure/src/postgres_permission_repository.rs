use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use aula_application::{NewPermission, PermissionRepository};
use aula_core::{AppError, AppResult};
use aula_domain::{Permission, PermissionKey};

use crate::{UNIQUE_VIOLATION, parse_id, sqlstate};

/// PostgreSQL-backed permission catalog.
#[derive(Clone)]
pub struct PostgresPermissionRepository {
    pool: PgPool,
}

impl PostgresPermissionRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
pub(crate) struct PermissionRow {
    id: Uuid,
    action: String,
    resource: String,
    description: Option<String>,
}

impl From<PermissionRow> for Permission {
    fn from(row: PermissionRow) -> Self {
        Self {
            id: row.id.to_string(),
            action: row.action,
            resource: row.resource,
            description: row.description,
        }
    }
}

#[async_trait]
impl PermissionRepository for PostgresPermissionRepository {
    async fn find_by_id(&self, permission_id: &str) -> AppResult<Option<Permission>> {
        let Some(permission_id) = parse_id(permission_id) else {
            return Ok(None);
        };

        let row = sqlx::query_as::<_, PermissionRow>(
            r#"
            SELECT id, action, resource, description
            FROM rbac_permissions
            WHERE id = $1
            "#,
        )
        .bind(permission_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find permission: {error}")))?;

        Ok(row.map(Permission::from))
    }

    async fn find_by_action_resource(&self, key: &PermissionKey) -> AppResult<Option<Permission>> {
        let row = sqlx::query_as::<_, PermissionRow>(
            r#"
            SELECT id, action, resource, description
            FROM rbac_permissions
            WHERE action = $1 AND resource = $2
            "#,
        )
        .bind(key.action())
        .bind(key.resource())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find permission: {error}")))?;

        Ok(row.map(Permission::from))
    }

    async fn create(&self, permission: NewPermission) -> AppResult<Permission> {
        let key = permission.key;
        let row = sqlx::query_as::<_, PermissionRow>(
            r#"
            INSERT INTO rbac_permissions (action, resource, description)
            VALUES ($1, $2, $3)
            RETURNING id, action, resource, description
            "#,
        )
        .bind(key.action())
        .bind(key.resource())
        .bind(permission.description.as_deref())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| {
            if sqlstate(&error).as_deref() == Some(UNIQUE_VIOLATION) {
                return AppError::PermissionAlreadyExists {
                    action: key.action().to_owned(),
                    resource: key.resource().to_owned(),
                };
            }

            AppError::Internal(format!("failed to create permission: {error}"))
        })?;

        Ok(row.into())
    }

    async fn list(&self) -> AppResult<Vec<Permission>> {
        let rows = sqlx::query_as::<_, PermissionRow>(
            r#"
            SELECT id, action, resource, description
            FROM rbac_permissions
            ORDER BY (action || ':' || resource) COLLATE "C"
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list permissions: {error}")))?;

        Ok(rows.into_iter().map(Permission::from).collect())
    }
}
