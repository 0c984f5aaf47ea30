use std::str::FromStr;

use aula_core::AppError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Opaque key-value record captured before or after a mutation.
pub type AuditSnapshot = Map<String, Value>;

/// Mutating RBAC actions recorded in the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    /// A role was created.
    CreateRole,
    /// A role was deleted.
    DeleteRole,
    /// A permission was attached to a role.
    AttachPermission,
    /// A permission was detached from a role.
    DetachPermission,
}

impl AuditAction {
    /// Returns a stable storage value for this action.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreateRole => "CREATE_ROLE",
            Self::DeleteRole => "DELETE_ROLE",
            Self::AttachPermission => "ATTACH_PERMISSION",
            Self::DetachPermission => "DETACH_PERMISSION",
        }
    }
}

impl FromStr for AuditAction {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "CREATE_ROLE" => Ok(Self::CreateRole),
            "DELETE_ROLE" => Ok(Self::DeleteRole),
            "ATTACH_PERMISSION" => Ok(Self::AttachPermission),
            "DETACH_PERMISSION" => Ok(Self::DetachPermission),
            _ => Err(AppError::Validation(format!(
                "unknown audit action value '{value}'"
            ))),
        }
    }
}

/// Immutable record of one mutating RBAC action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Stable entry identifier.
    pub id: String,
    /// Subject that performed the action.
    pub actor_id: String,
    /// Role affected by the action.
    pub role_id: String,
    /// Recorded action.
    pub action: AuditAction,
    /// Time the action completed.
    pub timestamp: DateTime<Utc>,
    /// State before the change, when one existed.
    pub before: Option<AuditSnapshot>,
    /// State after the change, when one exists.
    pub after: Option<AuditSnapshot>,
    /// Optional free-form reason.
    pub reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::AuditAction;

    #[test]
    fn action_roundtrip_storage_value() {
        for action in [
            AuditAction::CreateRole,
            AuditAction::DeleteRole,
            AuditAction::AttachPermission,
            AuditAction::DetachPermission,
        ] {
            assert_eq!(AuditAction::from_str(action.as_str()).ok(), Some(action));
        }
    }

    #[test]
    fn unknown_action_is_rejected() {
        assert!(AuditAction::from_str("RENAME_ROLE").is_err());
    }

    #[test]
    fn serde_uses_storage_value() {
        let encoded = serde_json::to_string(&AuditAction::AttachPermission);
        assert_eq!(encoded.ok().as_deref(), Some("\"ATTACH_PERMISSION\""));
    }
}
