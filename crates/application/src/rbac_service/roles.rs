use super::*;

use aula_core::{AppError, NonEmptyString};
use aula_domain::{AuditAction, Role};
use chrono::Utc;
use tracing::info;

use crate::{AuditEvent, CreateRoleInput, NewRole};

impl RbacService {
    /// Creates a role, optionally with grants, and emits an audit entry.
    pub async fn create_role(
        &self,
        actor: &UserIdentity,
        input: CreateRoleInput,
    ) -> AppResult<Role> {
        self.require_manage_grant(actor, ManagedResource::Roles)
            .await?;

        let name = NonEmptyString::for_field("role name", input.name)?;
        if self.roles.find_by_name(name.as_str()).await?.is_some() {
            return Err(AppError::RoleAlreadyExists { name: name.into() });
        }

        let new_role = NewRole {
            name: name.into(),
            description: input.description,
        };
        let created = if input.permission_ids.is_empty() {
            self.roles.create(new_role).await
        } else {
            self.roles
                .create_with_permissions(new_role, &input.permission_ids)
                .await
        };
        let role = created.map_err(AppError::into_transaction_failure)?;

        self.audit_repository
            .append_event(AuditEvent {
                actor_id: actor.subject().to_owned(),
                role_id: role.id.clone(),
                action: AuditAction::CreateRole,
                // Stamped on completion, so entries order by completion rather than commit.
                timestamp: Utc::now(),
                before: None,
                after: Some(role.snapshot()),
                reason: Some("Role created".to_owned()),
            })
            .await?;

        info!(
            actor = actor.subject(),
            role_id = %role.id,
            role_name = %role.name,
            granted = role.permissions.len(),
            "role created"
        );

        Ok(role)
    }

    /// Deletes a role and emits an audit entry with its last identity.
    pub async fn delete_role(&self, actor: &UserIdentity, role_id: &str) -> AppResult<()> {
        self.require_manage_grant(actor, ManagedResource::Roles)
            .await?;

        let role = self
            .roles
            .find_by_id(role_id)
            .await?
            .ok_or_else(|| AppError::RoleNotFound {
                role_id: role_id.to_owned(),
            })?;

        self.roles.delete(role_id).await?;

        self.audit_repository
            .append_event(AuditEvent {
                actor_id: actor.subject().to_owned(),
                role_id: role.id.clone(),
                action: AuditAction::DeleteRole,
                // Stamped on completion, so entries order by completion rather than commit.
                timestamp: Utc::now(),
                before: Some(role.snapshot()),
                after: None,
                reason: Some("Role deleted".to_owned()),
            })
            .await?;

        info!(actor = actor.subject(), role_id, role_name = %role.name, "role deleted");

        Ok(())
    }
}
