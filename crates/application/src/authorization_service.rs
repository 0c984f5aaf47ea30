use std::sync::Arc;

use async_trait::async_trait;
use aula_core::{AppError, AppResult};

use crate::RoleRepository;

/// Capability checks consumed by mutating use cases.
#[async_trait]
pub trait AuthorizationPort: Send + Sync {
    /// Lists role names held by a user.
    async fn roles_for_user(&self, user_id: &str) -> AppResult<Vec<String>>;

    /// Returns whether the user holds the named role.
    async fn has_role(&self, user_id: &str, role_name: &str) -> AppResult<bool>;

    /// Returns whether any of the user's roles grants `action` on `resource`.
    async fn has_permission(&self, user_id: &str, action: &str, resource: &str) -> AppResult<bool>;

    /// Fails with a forbidden error unless the user holds the named role.
    async fn requires_role(&self, user_id: &str, role_name: &str) -> AppResult<()> {
        if self.has_role(user_id, role_name).await? {
            return Ok(());
        }

        Err(AppError::MissingRole {
            role: role_name.to_owned(),
        })
    }

    /// Fails with a forbidden error unless the user holds the permission.
    async fn requires_permission(
        &self,
        user_id: &str,
        action: &str,
        resource: &str,
    ) -> AppResult<()> {
        if self.has_permission(user_id, action, resource).await? {
            return Ok(());
        }

        Err(AppError::MissingPermission {
            action: action.to_owned(),
            resource: resource.to_owned(),
        })
    }
}

/// Authorization adapter that resolves grants from the role store.
#[derive(Clone)]
pub struct RbacAuthorizationService {
    repository: Arc<dyn RoleRepository>,
}

impl RbacAuthorizationService {
    /// Creates a new authorization service from a repository implementation.
    #[must_use]
    pub fn new(repository: Arc<dyn RoleRepository>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl AuthorizationPort for RbacAuthorizationService {
    async fn roles_for_user(&self, user_id: &str) -> AppResult<Vec<String>> {
        Ok(self
            .repository
            .list_for_user(user_id)
            .await?
            .into_iter()
            .map(|role| role.name)
            .collect())
    }

    async fn has_role(&self, user_id: &str, role_name: &str) -> AppResult<bool> {
        let roles = self.roles_for_user(user_id).await?;
        Ok(roles.iter().any(|name| name == role_name))
    }

    async fn has_permission(&self, user_id: &str, action: &str, resource: &str) -> AppResult<bool> {
        let permissions = self.repository.permissions_for_user(user_id).await?;
        Ok(permissions
            .iter()
            .any(|permission| permission.grants(action, resource)))
    }
}
