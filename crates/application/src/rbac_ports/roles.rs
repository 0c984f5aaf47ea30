use async_trait::async_trait;

use aula_core::AppResult;
use aula_domain::{Permission, Role};

/// Input payload for creating roles.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CreateRoleInput {
    /// Unique role name.
    pub name: String,
    /// Optional human description.
    pub description: Option<String>,
    /// Permissions granted atomically with the new role.
    pub permission_ids: Vec<String>,
}

/// Input payload for attaching or detaching one permission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionGrantInput {
    /// Target role.
    pub role_id: String,
    /// Permission to attach or detach.
    pub permission_id: String,
}

/// Validated role row handed to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRole {
    /// Unique role name.
    pub name: String,
    /// Optional human description.
    pub description: Option<String>,
}

/// Role state observed around one grant mutation, read in the same transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleGrantChange {
    /// Role before the change.
    pub before: Role,
    /// Role after the change.
    pub after: Role,
}

/// Repository port for roles and their permission grants.
///
/// Multi-step methods are atomic: either every write lands or none does.
#[async_trait]
pub trait RoleRepository: Send + Sync {
    /// Lists roles assigned to a user, ordered by name.
    async fn list_for_user(&self, user_id: &str) -> AppResult<Vec<Role>>;

    /// Lists distinct permissions granted to a user through any role.
    async fn permissions_for_user(&self, user_id: &str) -> AppResult<Vec<Permission>>;

    /// Finds a role with its grants by id.
    async fn find_by_id(&self, role_id: &str) -> AppResult<Option<Role>>;

    /// Finds a role by exact, case-sensitive name.
    async fn find_by_name(&self, name: &str) -> AppResult<Option<Role>>;

    /// Creates a role without grants.
    async fn create(&self, role: NewRole) -> AppResult<Role>;

    /// Creates a role and grants every listed permission in one transaction.
    ///
    /// Fails with `PermissionsNotFound` naming all missing ids; no role row
    /// survives the failure.
    async fn create_with_permissions(
        &self,
        role: NewRole,
        permission_ids: &[String],
    ) -> AppResult<Role>;

    /// Lists all roles with grants, ordered by name.
    async fn list(&self) -> AppResult<Vec<Role>>;

    /// Verifies role and permission exist and upserts the grant, in one transaction.
    async fn attach_permission(
        &self,
        role_id: &str,
        permission_id: &str,
    ) -> AppResult<RoleGrantChange>;

    /// Verifies role and permission exist and removes the grant if present.
    async fn detach_permission(
        &self,
        role_id: &str,
        permission_id: &str,
    ) -> AppResult<RoleGrantChange>;

    /// Deletes a role together with its grants and user assignments.
    async fn delete(&self, role_id: &str) -> AppResult<()>;
}
