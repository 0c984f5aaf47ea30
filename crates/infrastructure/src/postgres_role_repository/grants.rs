use sqlx::PgConnection;

use super::*;

impl PostgresRoleRepository {
    pub(super) async fn attach_permission_impl(
        &self,
        role_id: &str,
        permission_id: &str,
    ) -> AppResult<RoleGrantChange> {
        let mut transaction = self.begin().await?;
        let (parsed_role_id, parsed_permission_id, before) =
            lock_grant_targets(&mut *transaction, role_id, permission_id).await?;

        sqlx::query(
            r#"
            INSERT INTO rbac_role_permissions (role_id, permission_id)
            VALUES ($1, $2)
            ON CONFLICT (role_id, permission_id) DO NOTHING
            "#,
        )
        .bind(parsed_role_id)
        .bind(parsed_permission_id)
        .execute(&mut *transaction)
        .await
        .map_err(|error| map_grant_error(error, role_id, permission_id))?;

        finish_grant_change(transaction, parsed_role_id, role_id, before).await
    }

    pub(super) async fn detach_permission_impl(
        &self,
        role_id: &str,
        permission_id: &str,
    ) -> AppResult<RoleGrantChange> {
        let mut transaction = self.begin().await?;
        let (parsed_role_id, parsed_permission_id, before) =
            lock_grant_targets(&mut *transaction, role_id, permission_id).await?;

        sqlx::query(
            r#"
            DELETE FROM rbac_role_permissions
            WHERE role_id = $1 AND permission_id = $2
            "#,
        )
        .bind(parsed_role_id)
        .bind(parsed_permission_id)
        .execute(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to detach permission: {error}")))?;

        finish_grant_change(transaction, parsed_role_id, role_id, before).await
    }
}

/// Locks the role and permission rows for the rest of the transaction and
/// returns the role as it was before the change.
async fn lock_grant_targets(
    connection: &mut PgConnection,
    role_id: &str,
    permission_id: &str,
) -> AppResult<(Uuid, Uuid, Role)> {
    let role_not_found = || AppError::RoleNotFound {
        role_id: role_id.to_owned(),
    };
    let permission_not_found = || AppError::PermissionNotFound {
        permission_id: permission_id.to_owned(),
    };

    let parsed_role_id = parse_id(role_id).ok_or_else(role_not_found)?;
    sqlx::query_scalar::<_, Uuid>(
        r#"
        SELECT id
        FROM rbac_roles
        WHERE id = $1
        FOR SHARE
        "#,
    )
    .bind(parsed_role_id)
    .fetch_optional(&mut *connection)
    .await
    .map_err(|error| AppError::Internal(format!("failed to lock role: {error}")))?
    .ok_or_else(role_not_found)?;

    let parsed_permission_id = parse_id(permission_id).ok_or_else(permission_not_found)?;
    sqlx::query_scalar::<_, Uuid>(
        r#"
        SELECT id
        FROM rbac_permissions
        WHERE id = $1
        FOR SHARE
        "#,
    )
    .bind(parsed_permission_id)
    .fetch_optional(&mut *connection)
    .await
    .map_err(|error| AppError::Internal(format!("failed to lock permission: {error}")))?
    .ok_or_else(permission_not_found)?;

    let before = fetch_role(&mut *connection, parsed_role_id)
        .await?
        .ok_or_else(role_not_found)?;

    Ok((parsed_role_id, parsed_permission_id, before))
}

async fn finish_grant_change(
    mut transaction: Transaction<'static, Postgres>,
    parsed_role_id: Uuid,
    role_id: &str,
    before: Role,
) -> AppResult<RoleGrantChange> {
    let after = fetch_role(&mut *transaction, parsed_role_id)
        .await?
        .ok_or_else(|| AppError::RoleNotFound {
            role_id: role_id.to_owned(),
        })?;

    commit(transaction).await?;

    Ok(RoleGrantChange { before, after })
}

fn map_grant_error(error: sqlx::Error, role_id: &str, permission_id: &str) -> AppError {
    if sqlstate(&error).as_deref() == Some(FOREIGN_KEY_VIOLATION) {
        let constraint = match &error {
            sqlx::Error::Database(database_error) => database_error.constraint(),
            _ => None,
        };

        if constraint.is_some_and(|name| name.contains("permission_id")) {
            return AppError::PermissionNotFound {
                permission_id: permission_id.to_owned(),
            };
        }

        return AppError::RoleNotFound {
            role_id: role_id.to_owned(),
        };
    }

    AppError::Internal(format!("failed to attach permission: {error}"))
}
