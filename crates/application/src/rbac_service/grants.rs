use super::*;

use aula_core::AppError;
use aula_domain::AuditAction;
use chrono::Utc;
use tracing::info;

use crate::{AuditEvent, PermissionGrantInput, RoleGrantChange};

impl RbacService {
    /// Grants a permission to a role. Re-attaching is a successful no-op.
    pub async fn attach_permission(
        &self,
        actor: &UserIdentity,
        input: PermissionGrantInput,
    ) -> AppResult<()> {
        self.require_manage_grant(actor, ManagedResource::Permissions)
            .await?;

        let change = self
            .roles
            .attach_permission(input.role_id.as_str(), input.permission_id.as_str())
            .await
            .map_err(AppError::into_transaction_failure)?;

        self.append_grant_event(
            actor,
            AuditAction::AttachPermission,
            change,
            format!("Attached permission {}", input.permission_id),
        )
        .await?;

        info!(
            actor = actor.subject(),
            role_id = %input.role_id,
            permission_id = %input.permission_id,
            "permission attached"
        );

        Ok(())
    }

    /// Revokes a permission from a role. Detaching an absent grant succeeds.
    pub async fn detach_permission(
        &self,
        actor: &UserIdentity,
        input: PermissionGrantInput,
    ) -> AppResult<()> {
        self.require_manage_grant(actor, ManagedResource::Permissions)
            .await?;

        let change = self
            .roles
            .detach_permission(input.role_id.as_str(), input.permission_id.as_str())
            .await
            .map_err(AppError::into_transaction_failure)?;

        self.append_grant_event(
            actor,
            AuditAction::DetachPermission,
            change,
            format!("Detached permission {}", input.permission_id),
        )
        .await?;

        info!(
            actor = actor.subject(),
            role_id = %input.role_id,
            permission_id = %input.permission_id,
            "permission detached"
        );

        Ok(())
    }

    async fn append_grant_event(
        &self,
        actor: &UserIdentity,
        action: AuditAction,
        change: RoleGrantChange,
        reason: String,
    ) -> AppResult<()> {
        self.audit_repository
            .append_event(AuditEvent {
                actor_id: actor.subject().to_owned(),
                role_id: change.after.id.clone(),
                action,
                // Stamped on completion, so entries order by completion rather than commit.
                timestamp: Utc::now(),
                before: Some(change.before.snapshot_with_permissions()),
                after: Some(change.after.snapshot_with_permissions()),
                reason: Some(reason),
            })
            .await
    }
}
