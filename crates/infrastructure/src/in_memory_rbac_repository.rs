use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use aula_application::{
    NewPermission, NewRole, PermissionRepository, RoleGrantChange, RoleRepository,
};
use aula_core::{AppError, AppResult};
use aula_domain::{ADMIN_ROLE, Permission, PermissionKey, Role};
use tokio::sync::RwLock;
use uuid::Uuid;

mod grants;

#[cfg(test)]
mod tests;

#[derive(Debug, Clone)]
struct RoleRow {
    name: String,
    description: Option<String>,
}

#[derive(Debug, Default)]
struct RbacState {
    roles: HashMap<String, RoleRow>,
    permissions: HashMap<String, Permission>,
    role_permissions: BTreeSet<(String, String)>,
    user_roles: BTreeSet<(String, String)>,
}

impl RbacState {
    fn role(&self, role_id: &str) -> Option<Role> {
        let row = self.roles.get(role_id)?;
        let mut permissions: Vec<_> = self
            .role_permissions
            .iter()
            .filter(|(stored_role_id, _)| stored_role_id == role_id)
            .filter_map(|(_, permission_id)| self.permissions.get(permission_id))
            .map(Permission::to_ref)
            .collect();
        permissions.sort_by(|left, right| left.name.cmp(&right.name));

        Some(Role {
            id: role_id.to_owned(),
            name: row.name.clone(),
            description: row.description.clone(),
            permissions,
        })
    }

    fn sorted_roles<'a>(&self, role_ids: impl Iterator<Item = &'a String>) -> Vec<Role> {
        let mut roles: Vec<Role> = role_ids.filter_map(|role_id| self.role(role_id)).collect();
        roles.sort_by(|left, right| left.name.cmp(&right.name));
        roles
    }

    fn role_id_by_name(&self, name: &str) -> Option<String> {
        self.roles
            .iter()
            .find_map(|(role_id, row)| (row.name == name).then(|| role_id.clone()))
    }

    fn insert_role(&mut self, role: NewRole) -> AppResult<String> {
        if self.role_id_by_name(role.name.as_str()).is_some() {
            return Err(AppError::RoleAlreadyExists { name: role.name });
        }

        let role_id = Uuid::new_v4().to_string();
        self.roles.insert(
            role_id.clone(),
            RoleRow {
                name: role.name,
                description: role.description,
            },
        );
        Ok(role_id)
    }

    fn require_role(&self, role_id: &str) -> AppResult<Role> {
        self.role(role_id).ok_or_else(|| AppError::RoleNotFound {
            role_id: role_id.to_owned(),
        })
    }

    fn require_permission(&self, permission_id: &str) -> AppResult<()> {
        if self.permissions.contains_key(permission_id) {
            return Ok(());
        }

        Err(AppError::PermissionNotFound {
            permission_id: permission_id.to_owned(),
        })
    }
}

/// In-memory role, permission and assignment store.
///
/// Every multi-step mutation runs under one write lock, which gives the same
/// all-or-nothing behavior as a database transaction.
#[derive(Debug, Default)]
pub struct InMemoryRbacRepository {
    state: RwLock<RbacState>,
}

impl InMemoryRbacRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Assigns an existing role to a user. Assigning twice is a no-op.
    pub async fn assign_role_to_user(&self, user_id: &str, role_id: &str) -> AppResult<()> {
        let mut state = self.state.write().await;
        state.require_role(role_id)?;
        state
            .user_roles
            .insert((user_id.to_owned(), role_id.to_owned()));
        Ok(())
    }

    /// Ensures the admin role exists and is assigned to `user_id`.
    pub async fn bootstrap_admin(&self, user_id: &str) -> AppResult<Role> {
        let mut state = self.state.write().await;
        let role_id = match state.role_id_by_name(ADMIN_ROLE) {
            Some(role_id) => role_id,
            None => state.insert_role(NewRole {
                name: ADMIN_ROLE.to_owned(),
                description: Some("Full RBAC administration".to_owned()),
            })?,
        };
        state
            .user_roles
            .insert((user_id.to_owned(), role_id.clone()));
        state.require_role(role_id.as_str())
    }
}

#[async_trait]
impl RoleRepository for InMemoryRbacRepository {
    async fn list_for_user(&self, user_id: &str) -> AppResult<Vec<Role>> {
        let state = self.state.read().await;
        let role_ids = state
            .user_roles
            .iter()
            .filter(|(stored_user_id, _)| stored_user_id == user_id)
            .map(|(_, role_id)| role_id);
        Ok(state.sorted_roles(role_ids))
    }

    async fn permissions_for_user(&self, user_id: &str) -> AppResult<Vec<Permission>> {
        let state = self.state.read().await;
        let permission_ids: BTreeSet<&String> = state
            .user_roles
            .iter()
            .filter(|(stored_user_id, _)| stored_user_id == user_id)
            .flat_map(|(_, role_id)| {
                state
                    .role_permissions
                    .iter()
                    .filter(move |(stored_role_id, _)| stored_role_id == role_id)
                    .map(|(_, permission_id)| permission_id)
            })
            .collect();

        let mut permissions: Vec<Permission> = permission_ids
            .into_iter()
            .filter_map(|permission_id| state.permissions.get(permission_id).cloned())
            .collect();
        permissions.sort_by_key(Permission::name);
        Ok(permissions)
    }

    async fn find_by_id(&self, role_id: &str) -> AppResult<Option<Role>> {
        Ok(self.state.read().await.role(role_id))
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Role>> {
        let state = self.state.read().await;
        Ok(state
            .role_id_by_name(name)
            .and_then(|role_id| state.role(role_id.as_str())))
    }

    async fn create(&self, role: NewRole) -> AppResult<Role> {
        let mut state = self.state.write().await;
        let role_id = state.insert_role(role)?;
        state.require_role(role_id.as_str())
    }

    async fn create_with_permissions(
        &self,
        role: NewRole,
        permission_ids: &[String],
    ) -> AppResult<Role> {
        let mut state = self.state.write().await;

        let mut missing: Vec<String> = Vec::new();
        for permission_id in permission_ids {
            if !state.permissions.contains_key(permission_id) && !missing.contains(permission_id) {
                missing.push(permission_id.clone());
            }
        }
        if !missing.is_empty() {
            return Err(AppError::PermissionsNotFound {
                permission_ids: missing,
            });
        }

        let role_id = state.insert_role(role)?;
        for permission_id in permission_ids {
            state
                .role_permissions
                .insert((role_id.clone(), permission_id.clone()));
        }

        state.require_role(role_id.as_str())
    }

    async fn list(&self) -> AppResult<Vec<Role>> {
        let state = self.state.read().await;
        Ok(state.sorted_roles(state.roles.keys()))
    }

    async fn attach_permission(
        &self,
        role_id: &str,
        permission_id: &str,
    ) -> AppResult<RoleGrantChange> {
        let mut state = self.state.write().await;
        grants::attach(&mut state, role_id, permission_id)
    }

    async fn detach_permission(
        &self,
        role_id: &str,
        permission_id: &str,
    ) -> AppResult<RoleGrantChange> {
        let mut state = self.state.write().await;
        grants::detach(&mut state, role_id, permission_id)
    }

    async fn delete(&self, role_id: &str) -> AppResult<()> {
        let mut state = self.state.write().await;
        if state.roles.remove(role_id).is_none() {
            return Err(AppError::RoleNotFound {
                role_id: role_id.to_owned(),
            });
        }

        state
            .role_permissions
            .retain(|(stored_role_id, _)| stored_role_id != role_id);
        state
            .user_roles
            .retain(|(_, stored_role_id)| stored_role_id != role_id);
        Ok(())
    }
}

#[async_trait]
impl PermissionRepository for InMemoryRbacRepository {
    async fn find_by_id(&self, permission_id: &str) -> AppResult<Option<Permission>> {
        Ok(self
            .state
            .read()
            .await
            .permissions
            .get(permission_id)
            .cloned())
    }

    async fn find_by_action_resource(&self, key: &PermissionKey) -> AppResult<Option<Permission>> {
        Ok(self
            .state
            .read()
            .await
            .permissions
            .values()
            .find(|permission| permission.grants(key.action(), key.resource()))
            .cloned())
    }

    async fn create(&self, permission: NewPermission) -> AppResult<Permission> {
        let mut state = self.state.write().await;
        let key = permission.key;
        if state
            .permissions
            .values()
            .any(|stored| stored.grants(key.action(), key.resource()))
        {
            return Err(AppError::PermissionAlreadyExists {
                action: key.action().to_owned(),
                resource: key.resource().to_owned(),
            });
        }

        let created = Permission {
            id: Uuid::new_v4().to_string(),
            action: key.action().to_owned(),
            resource: key.resource().to_owned(),
            description: permission.description,
        };
        state
            .permissions
            .insert(created.id.clone(), created.clone());
        Ok(created)
    }

    async fn list(&self) -> AppResult<Vec<Permission>> {
        let mut permissions: Vec<Permission> = self
            .state
            .read()
            .await
            .permissions
            .values()
            .cloned()
            .collect();
        permissions.sort_by_key(Permission::name);
        Ok(permissions)
    }
}
