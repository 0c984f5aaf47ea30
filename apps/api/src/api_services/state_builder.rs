use std::sync::Arc;

use aula_application::{
    AuditRepository, PermissionRepository, RbacAuthorizationService, RbacService, RoleRepository,
};
use aula_core::AppError;
use aula_infrastructure::{
    InMemoryAuditRepository, InMemoryRbacRepository, PostgresAuditRepository,
    PostgresPermissionRepository, PostgresRoleRepository,
};
use sqlx::PgPool;
use tracing::info;

use crate::state::AppState;

struct RepositorySet {
    roles: Arc<dyn RoleRepository>,
    permissions: Arc<dyn PermissionRepository>,
    audit: Arc<dyn AuditRepository>,
}

pub async fn build_app_state(
    pool: Option<PgPool>,
    bootstrap_admin: Option<&str>,
) -> Result<AppState, AppError> {
    let repositories = match pool {
        Some(pool) => postgres_repositories(pool, bootstrap_admin).await?,
        None => memory_repositories(bootstrap_admin).await?,
    };

    let authorization = Arc::new(RbacAuthorizationService::new(repositories.roles.clone()));

    Ok(AppState {
        rbac_service: RbacService::new(
            authorization,
            repositories.roles,
            repositories.permissions,
            repositories.audit,
        ),
    })
}

async fn postgres_repositories(
    pool: PgPool,
    bootstrap_admin: Option<&str>,
) -> Result<RepositorySet, AppError> {
    let roles = Arc::new(PostgresRoleRepository::new(pool.clone()));
    if let Some(subject) = bootstrap_admin {
        let role = roles.bootstrap_admin(subject).await?;
        info!(
            subject,
            role_id = role.id.as_str(),
            "bootstrap admin ensured"
        );
    }

    Ok(RepositorySet {
        roles,
        permissions: Arc::new(PostgresPermissionRepository::new(pool.clone())),
        audit: Arc::new(PostgresAuditRepository::new(pool)),
    })
}

async fn memory_repositories(bootstrap_admin: Option<&str>) -> Result<RepositorySet, AppError> {
    let store = Arc::new(InMemoryRbacRepository::new());
    if let Some(subject) = bootstrap_admin {
        let role = store.bootstrap_admin(subject).await?;
        info!(
            subject,
            role_id = role.id.as_str(),
            "bootstrap admin ensured"
        );
    }

    Ok(RepositorySet {
        roles: store.clone(),
        permissions: store,
        audit: Arc::new(InMemoryAuditRepository::new()),
    })
}
