use async_trait::async_trait;
use sqlx::{FromRow, PgExecutor, PgPool, Postgres, Transaction};
use tracing::warn;
use uuid::Uuid;

use aula_application::{NewRole, RoleGrantChange, RoleRepository};
use aula_core::{AppError, AppResult};
use aula_domain::{ADMIN_ROLE, Permission, Role};

use crate::postgres_permission_repository::PermissionRow;
use crate::{FOREIGN_KEY_VIOLATION, UNIQUE_VIOLATION, parse_id, sqlstate};

mod grants;


/// PostgreSQL-backed repository for roles, grants and user assignments.
#[derive(Clone)]
pub struct PostgresRoleRepository {
    pool: PgPool,
}

impl PostgresRoleRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Assigns an existing role to a user. Assigning twice is a no-op.
    pub async fn assign_role_to_user(&self, user_id: &str, role_id: &str) -> AppResult<()> {
        let not_found = || AppError::RoleNotFound {
            role_id: role_id.to_owned(),
        };
        let parsed_role_id = parse_id(role_id).ok_or_else(not_found)?;

        sqlx::query(
            r#"
            INSERT INTO rbac_user_roles (user_id, role_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, role_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(parsed_role_id)
        .execute(&self.pool)
        .await
        .map_err(|error| {
            if sqlstate(&error).as_deref() == Some(FOREIGN_KEY_VIOLATION) {
                return not_found();
            }

            AppError::Internal(format!("failed to assign role: {error}"))
        })?;

        Ok(())
    }

    /// Ensures the admin role exists and is assigned to `user_id`.
    pub async fn bootstrap_admin(&self, user_id: &str) -> AppResult<Role> {
        let mut transaction = self.begin().await?;

        let role_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO rbac_roles (name, description)
            VALUES ($1, $2)
            ON CONFLICT (name) DO UPDATE
            SET name = EXCLUDED.name
            RETURNING id
            "#,
        )
        .bind(ADMIN_ROLE)
        .bind("Full RBAC administration")
        .fetch_one(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to ensure admin role: {error}")))?;

        sqlx::query(
            r#"
            INSERT INTO rbac_user_roles (user_id, role_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, role_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(role_id)
        .execute(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to assign admin role: {error}")))?;

        let role = fetch_role(&mut *transaction, role_id)
            .await?
            .ok_or_else(|| AppError::Internal("admin role vanished during bootstrap".to_owned()))?;

        commit(transaction).await?;

        Ok(role)
    }

    async fn begin(&self) -> AppResult<Transaction<'static, Postgres>> {
        self.pool
            .begin()
            .await
            .map_err(|error| AppError::Internal(format!("failed to begin transaction: {error}")))
    }
}

async fn commit(transaction: Transaction<'static, Postgres>) -> AppResult<()> {
    transaction
        .commit()
        .await
        .map_err(|error| AppError::Internal(format!("failed to commit transaction: {error}")))
}

#[derive(Debug, FromRow)]
struct RoleRow {
    role_id: Uuid,
    role_name: String,
    description: Option<String>,
    permission_id: Option<Uuid>,
    permission_action: Option<String>,
    permission_resource: Option<String>,
}

/// Builds a role projection query; rows arrive grouped by role, grants sorted by name.
fn role_query(filter: &str) -> String {
    format!(
        r#"
        SELECT
            roles.id AS role_id,
            roles.name AS role_name,
            roles.description,
            permissions.id AS permission_id,
            permissions.action AS permission_action,
            permissions.resource AS permission_resource
        FROM rbac_roles AS roles
        LEFT JOIN rbac_role_permissions AS grants
            ON grants.role_id = roles.id
        LEFT JOIN rbac_permissions AS permissions
            ON permissions.id = grants.permission_id
        {filter}
        ORDER BY
            roles.name COLLATE "C",
            (permissions.action || ':' || permissions.resource) COLLATE "C"
        "#
    )
}

fn aggregate_roles(rows: Vec<RoleRow>) -> Vec<Role> {
    let mut roles: Vec<Role> = Vec::new();

    for row in rows {
        let role_id = row.role_id.to_string();
        if roles.last().is_none_or(|role| role.id != role_id) {
            roles.push(Role::new(role_id, row.role_name, row.description));
        }

        let grant = row
            .permission_id
            .zip(row.permission_action)
            .zip(row.permission_resource);
        if let (Some(((id, action), resource)), Some(role)) = (grant, roles.last_mut()) {
            let permission = Permission {
                id: id.to_string(),
                action,
                resource,
                description: None,
            };
            role.permissions.push(permission.to_ref());
        }
    }

    roles
}

async fn fetch_role<'e, E>(executor: E, role_id: Uuid) -> AppResult<Option<Role>>
where
    E: PgExecutor<'e>,
{
    let sql = role_query("WHERE roles.id = $1");
    let rows = sqlx::query_as::<_, RoleRow>(sql.as_str())
        .bind(role_id)
        .fetch_all(executor)
        .await
        .map_err(|error| AppError::Internal(format!("failed to load role: {error}")))?;

    Ok(aggregate_roles(rows).into_iter().next())
}

fn map_role_conflict(error: sqlx::Error, role_name: &str) -> AppError {
    if sqlstate(&error).as_deref() == Some(UNIQUE_VIOLATION) {
        return AppError::RoleAlreadyExists {
            name: role_name.to_owned(),
        };
    }

    AppError::Internal(format!("failed to create role: {error}"))
}

/// Returns the requested ids that are absent from `found`, deduplicated, in request order.
fn missing_permission_ids(requested: &[String], found: &[Uuid]) -> Vec<String> {
    let mut missing: Vec<String> = Vec::new();
    for permission_id in requested {
        let exists = parse_id(permission_id).is_some_and(|id| found.contains(&id));
        if !exists && !missing.contains(permission_id) {
            missing.push(permission_id.clone());
        }
    }
    missing
}

#[async_trait]
impl RoleRepository for PostgresRoleRepository {
    async fn list_for_user(&self, user_id: &str) -> AppResult<Vec<Role>> {
        let sql = role_query(
            "WHERE roles.id IN (SELECT role_id FROM rbac_user_roles WHERE user_id = $1)",
        );
        let rows = sqlx::query_as::<_, RoleRow>(sql.as_str())
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to list roles for user: {error}"))
            })?;

        Ok(aggregate_roles(rows))
    }

    async fn permissions_for_user(&self, user_id: &str) -> AppResult<Vec<Permission>> {
        let rows = sqlx::query_as::<_, PermissionRow>(
            r#"
            SELECT permissions.id, permissions.action, permissions.resource, permissions.description
            FROM rbac_permissions AS permissions
            WHERE permissions.id IN (
                SELECT grants.permission_id
                FROM rbac_user_roles AS user_roles
                INNER JOIN rbac_role_permissions AS grants
                    ON grants.role_id = user_roles.role_id
                WHERE user_roles.user_id = $1
            )
            ORDER BY (permissions.action || ':' || permissions.resource) COLLATE "C"
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to list permissions for user: {error}"))
        })?;

        Ok(rows.into_iter().map(Permission::from).collect())
    }

    async fn find_by_id(&self, role_id: &str) -> AppResult<Option<Role>> {
        let Some(role_id) = parse_id(role_id) else {
            return Ok(None);
        };

        fetch_role(&self.pool, role_id).await
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Role>> {
        let sql = role_query("WHERE roles.name = $1");
        let rows = sqlx::query_as::<_, RoleRow>(sql.as_str())
            .bind(name)
            .fetch_all(&self.pool)
            .await
            .map_err(|error| AppError::Internal(format!("failed to find role: {error}")))?;

        Ok(aggregate_roles(rows).into_iter().next())
    }

    async fn create(&self, role: NewRole) -> AppResult<Role> {
        let role_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO rbac_roles (name, description)
            VALUES ($1, $2)
            RETURNING id
            "#,
        )
        .bind(role.name.as_str())
        .bind(role.description.as_deref())
        .fetch_one(&self.pool)
        .await
        .map_err(|error| map_role_conflict(error, role.name.as_str()))?;

        Ok(Role::new(role_id.to_string(), role.name, role.description))
    }

    async fn create_with_permissions(
        &self,
        role: NewRole,
        permission_ids: &[String],
    ) -> AppResult<Role> {
        let parsed_ids: Vec<Uuid> = permission_ids
            .iter()
            .filter_map(|permission_id| parse_id(permission_id))
            .collect();

        let mut transaction = self.begin().await?;

        let found = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT id
            FROM rbac_permissions
            WHERE id = ANY($1)
            FOR SHARE
            "#,
        )
        .bind(&parsed_ids)
        .fetch_all(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to resolve permissions: {error}")))?;

        let missing = missing_permission_ids(permission_ids, &found);
        if !missing.is_empty() {
            warn!(
                role_name = role.name.as_str(),
                missing = missing.len(),
                "role creation rolled back"
            );
            return Err(AppError::PermissionsNotFound {
                permission_ids: missing,
            });
        }

        let role_id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO rbac_roles (name, description)
            VALUES ($1, $2)
            RETURNING id
            "#,
        )
        .bind(role.name.as_str())
        .bind(role.description.as_deref())
        .fetch_one(&mut *transaction)
        .await
        .map_err(|error| map_role_conflict(error, role.name.as_str()))?;

        sqlx::query(
            r#"
            INSERT INTO rbac_role_permissions (role_id, permission_id)
            SELECT $1, UNNEST($2::UUID[])
            ON CONFLICT (role_id, permission_id) DO NOTHING
            "#,
        )
        .bind(role_id)
        .bind(&parsed_ids)
        .execute(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to persist role grants: {error}")))?;

        let created = fetch_role(&mut *transaction, role_id)
            .await?
            .ok_or_else(|| AppError::Internal("created role could not be reloaded".to_owned()))?;

        commit(transaction).await?;

        Ok(created)
    }

    async fn list(&self) -> AppResult<Vec<Role>> {
        let sql = role_query("");
        let rows = sqlx::query_as::<_, RoleRow>(sql.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(|error| AppError::Internal(format!("failed to list roles: {error}")))?;

        Ok(aggregate_roles(rows))
    }

    async fn attach_permission(
        &self,
        role_id: &str,
        permission_id: &str,
    ) -> AppResult<RoleGrantChange> {
        self.attach_permission_impl(role_id, permission_id).await
    }

    async fn detach_permission(
        &self,
        role_id: &str,
        permission_id: &str,
    ) -> AppResult<RoleGrantChange> {
        self.detach_permission_impl(role_id, permission_id).await
    }

    async fn delete(&self, role_id: &str) -> AppResult<()> {
        let not_found = || AppError::RoleNotFound {
            role_id: role_id.to_owned(),
        };
        let parsed_role_id = parse_id(role_id).ok_or_else(not_found)?;

        let rows_affected = sqlx::query(
            r#"
            DELETE FROM rbac_roles
            WHERE id = $1
            "#,
        )
        .bind(parsed_role_id)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete role: {error}")))?
        .rows_affected();

        if rows_affected == 0 {
            return Err(not_found());
        }

        Ok(())
    }
}
