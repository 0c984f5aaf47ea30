use async_trait::async_trait;

use aula_core::AppResult;
use aula_domain::{Permission, PermissionKey};

/// Input payload for creating permissions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatePermissionInput {
    /// Granted action.
    pub action: String,
    /// Target resource.
    pub resource: String,
    /// Optional human description.
    pub description: Option<String>,
}

/// Validated permission row handed to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPermission {
    /// Unique `(action, resource)` pair.
    pub key: PermissionKey,
    /// Optional human description.
    pub description: Option<String>,
}

/// Repository port for permission definitions.
#[async_trait]
pub trait PermissionRepository: Send + Sync {
    /// Finds a permission by id.
    async fn find_by_id(&self, permission_id: &str) -> AppResult<Option<Permission>>;

    /// Finds a permission by its unique pair.
    async fn find_by_action_resource(&self, key: &PermissionKey) -> AppResult<Option<Permission>>;

    /// Creates a permission.
    async fn create(&self, permission: NewPermission) -> AppResult<Permission>;

    /// Lists all permissions ordered by name.
    async fn list(&self) -> AppResult<Vec<Permission>>;
}
