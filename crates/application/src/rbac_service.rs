use std::sync::Arc;

use aula_core::{AppResult, UserIdentity};
use aula_domain::{ADMIN_ROLE, MANAGE_ACTION, ManagedResource};
use tracing::warn;

use crate::{AuditRepository, AuthorizationPort, PermissionRepository, RoleRepository};

mod grants;
mod permissions;
mod queries;
mod roles;


/// Application service for role and permission administration.
///
/// Every mutating method runs the manage gate, performs one store operation
/// and appends at most one audit entry.
#[derive(Clone)]
pub struct RbacService {
    authorization: Arc<dyn AuthorizationPort>,
    roles: Arc<dyn RoleRepository>,
    permissions: Arc<dyn PermissionRepository>,
    audit_repository: Arc<dyn AuditRepository>,
}

impl RbacService {
    /// Creates a new service from required dependencies.
    #[must_use]
    pub fn new(
        authorization: Arc<dyn AuthorizationPort>,
        roles: Arc<dyn RoleRepository>,
        permissions: Arc<dyn PermissionRepository>,
        audit_repository: Arc<dyn AuditRepository>,
    ) -> Self {
        Self {
            authorization,
            roles,
            permissions,
            audit_repository,
        }
    }

    /// Allows the actor through when it is an admin or holds `manage` on `resource`.
    ///
    /// Denials are reported through `requires_role(admin)`, so the error names
    /// the admin role even when the manage grant was the one that mattered.
    async fn require_manage_grant(
        &self,
        actor: &UserIdentity,
        resource: ManagedResource,
    ) -> AppResult<()> {
        let subject = actor.subject();
        let is_admin = self.authorization.has_role(subject, ADMIN_ROLE).await?;
        let can_manage = self
            .authorization
            .has_permission(subject, MANAGE_ACTION, resource.as_str())
            .await?;

        if !is_admin && !can_manage {
            warn!(
                actor = subject,
                resource = resource.as_str(),
                "rbac mutation denied"
            );
            self.authorization.requires_role(subject, ADMIN_ROLE).await?;
        }

        Ok(())
    }
}
