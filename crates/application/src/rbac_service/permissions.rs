use super::*;

use aula_core::AppError;
use aula_domain::{Permission, PermissionKey};
use tracing::info;

use crate::{CreatePermissionInput, NewPermission};

impl RbacService {
    /// Creates a permission. Permission creation is not audited.
    pub async fn create_permission(
        &self,
        actor: &UserIdentity,
        input: CreatePermissionInput,
    ) -> AppResult<Permission> {
        self.require_manage_grant(actor, ManagedResource::Permissions)
            .await?;

        let key = PermissionKey::new(input.action, input.resource)?;
        if self
            .permissions
            .find_by_action_resource(&key)
            .await?
            .is_some()
        {
            return Err(AppError::PermissionAlreadyExists {
                action: key.action().to_owned(),
                resource: key.resource().to_owned(),
            });
        }

        let permission = self
            .permissions
            .create(NewPermission {
                key,
                description: input.description,
            })
            .await?;

        info!(
            actor = actor.subject(),
            permission_id = %permission.id,
            permission = %permission.name(),
            "permission created"
        );

        Ok(permission)
    }
}
