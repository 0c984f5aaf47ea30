use super::*;

use aula_domain::{AuditEntry, Permission, Role};

impl RbacService {
    /// Lists all roles with their grants, ordered by name.
    pub async fn list_roles(&self) -> AppResult<Vec<Role>> {
        self.roles.list().await
    }

    /// Lists all permissions, ordered by name.
    pub async fn list_permissions(&self) -> AppResult<Vec<Permission>> {
        self.permissions.list().await
    }

    /// Lists roles assigned to a user, ordered by name.
    pub async fn roles_for_user(&self, user_id: &str) -> AppResult<Vec<Role>> {
        self.roles.list_for_user(user_id).await
    }

    /// Lists audit entries recorded for a role, newest first.
    pub async fn audit_entries_for_role(&self, role_id: &str) -> AppResult<Vec<AuditEntry>> {
        self.audit_repository.list_entries_for_role(role_id).await
    }
}
