use aula_domain::{AuditEntry, AuditSnapshot, Permission, PermissionRef, Role};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Incoming payload for role creation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoleRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub permission_ids: Vec<String>,
}

/// Incoming payload for permission creation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePermissionRequest {
    pub action: String,
    pub resource: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Query string for audit lookups.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditQuery {
    pub role_id: String,
}

/// Acknowledgement for mutations without a body.
#[derive(Debug, Serialize)]
pub struct OkResponse {
    pub ok: bool,
}

impl OkResponse {
    pub fn ok() -> Self {
        Self { ok: true }
    }
}

/// API representation of a permission reference embedded in a role.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionRefResponse {
    pub id: String,
    pub name: String,
}

impl From<PermissionRef> for PermissionRefResponse {
    fn from(value: PermissionRef) -> Self {
        Self {
            id: value.id,
            name: value.name,
        }
    }
}

/// API representation of a role.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleResponse {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub permissions: Vec<PermissionRefResponse>,
}

impl From<Role> for RoleResponse {
    fn from(value: Role) -> Self {
        Self {
            id: value.id,
            name: value.name,
            description: value.description,
            permissions: value
                .permissions
                .into_iter()
                .map(PermissionRefResponse::from)
                .collect(),
        }
    }
}

/// API representation of a permission.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionResponse {
    pub id: String,
    pub name: String,
    pub action: String,
    pub resource: String,
    pub description: Option<String>,
}

impl From<Permission> for PermissionResponse {
    fn from(value: Permission) -> Self {
        Self {
            name: value.name(),
            id: value.id,
            action: value.action,
            resource: value.resource,
            description: value.description,
        }
    }
}

/// API representation of an audit entry.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntryResponse {
    pub id: String,
    pub actor_id: String,
    pub role_id: String,
    pub action: &'static str,
    pub timestamp: DateTime<Utc>,
    pub before: Option<AuditSnapshot>,
    pub after: Option<AuditSnapshot>,
    pub reason: Option<String>,
}

impl From<AuditEntry> for AuditEntryResponse {
    fn from(value: AuditEntry) -> Self {
        Self {
            id: value.id,
            actor_id: value.actor_id,
            role_id: value.role_id,
            action: value.action.as_str(),
            timestamp: value.timestamp,
            before: value.before,
            after: value.after,
            reason: value.reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use aula_domain::{Permission, Role};
    use serde_json::json;

    use super::{CreateRoleRequest, PermissionResponse, RoleResponse};

    #[test]
    fn create_role_request_accepts_camel_case_and_defaults() {
        let full: Result<CreateRoleRequest, _> = serde_json::from_value(json!({
            "name": "docente",
            "description": "Teacher",
            "permissionIds": ["p1"],
        }));
        assert!(matches!(
            full,
            Ok(CreateRoleRequest { ref permission_ids, .. }) if permission_ids == &["p1".to_owned()]
        ));

        let minimal: Result<CreateRoleRequest, _> =
            serde_json::from_value(json!({ "name": "tutor" }));
        assert!(matches!(
            minimal,
            Ok(CreateRoleRequest { description: None, ref permission_ids, .. })
                if permission_ids.is_empty()
        ));
    }

    #[test]
    fn role_response_embeds_permission_names() {
        let permission = Permission {
            id: "p1".to_owned(),
            action: "grade".to_owned(),
            resource: "submissions".to_owned(),
            description: None,
        };
        let mut role = Role::new("r1", "docente", None);
        role.permissions.push(permission.to_ref());

        let encoded = serde_json::to_value(RoleResponse::from(role)).ok();
        assert_eq!(
            encoded,
            Some(json!({
                "id": "r1",
                "name": "docente",
                "description": null,
                "permissions": [{ "id": "p1", "name": "grade:submissions" }],
            }))
        );

        let encoded = serde_json::to_value(PermissionResponse::from(permission)).ok();
        assert_eq!(
            encoded
                .as_ref()
                .and_then(|value| value.get("name"))
                .cloned(),
            Some(json!("grade:submissions"))
        );
    }
}
