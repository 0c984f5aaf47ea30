use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::{AuditSnapshot, PermissionRef};

/// Named bundle of permissions assignable to users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// Stable role identifier.
    pub id: String,
    /// Unique role name, compared case-sensitively.
    pub name: String,
    /// Optional human description.
    pub description: Option<String>,
    /// Effective role grants, ordered by permission name.
    pub permissions: Vec<PermissionRef>,
}

impl Role {
    /// Creates a role without grants.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: Option<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description,
            permissions: Vec::new(),
        }
    }

    /// Returns whether the role grants the given permission id.
    #[must_use]
    pub fn has_permission(&self, permission_id: &str) -> bool {
        self.permissions
            .iter()
            .any(|permission| permission.id == permission_id)
    }

    /// Returns the identity snapshot `{id, name, description}` used in audit rows.
    #[must_use]
    pub fn snapshot(&self) -> AuditSnapshot {
        let mut snapshot = AuditSnapshot::new();
        snapshot.insert("id".to_owned(), Value::String(self.id.clone()));
        snapshot.insert("name".to_owned(), Value::String(self.name.clone()));
        snapshot.insert(
            "description".to_owned(),
            self.description.clone().map_or(Value::Null, Value::String),
        );
        snapshot
    }

    /// Returns the identity snapshot extended with the permission list.
    #[must_use]
    pub fn snapshot_with_permissions(&self) -> AuditSnapshot {
        let mut snapshot = self.snapshot();
        let permissions = self
            .permissions
            .iter()
            .map(|permission| json!({ "id": permission.id, "name": permission.name }))
            .collect();
        snapshot.insert("permissions".to_owned(), Value::Array(permissions));
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use aula_core::NonEmptyString;
    use proptest::prelude::*;
    use serde_json::{Value, json};

    use super::Role;
    use crate::PermissionRef;

    #[test]
    fn snapshot_writes_null_description() {
        let role = Role::new("r-1", "docente", None);
        let snapshot = role.snapshot();

        assert_eq!(snapshot.get("name"), Some(&json!("docente")));
        assert_eq!(snapshot.get("description"), Some(&Value::Null));
        assert!(!snapshot.contains_key("permissions"));
    }

    #[test]
    fn snapshot_with_permissions_lists_grants() {
        let mut role = Role::new("r-1", "docente", Some("Teacher".to_owned()));
        role.permissions.push(PermissionRef {
            id: "p-1".to_owned(),
            name: "read:exams".to_owned(),
        });

        let snapshot = role.snapshot_with_permissions();
        assert_eq!(
            snapshot.get("permissions"),
            Some(&json!([{ "id": "p-1", "name": "read:exams" }]))
        );
        assert!(role.has_permission("p-1"));
        assert!(!role.has_permission("p-2"));
    }

    proptest! {
        #[test]
        fn role_name_survives_validation(name in " ?[A-Za-z][A-Za-z0-9_-]{0,30} ?") {
            let validated = NonEmptyString::for_field("role name", name.clone());
            prop_assert!(validated.is_ok());
            let validated = validated.map_err(|error| TestCaseError::fail(error.to_string()))?;

            let snapshot = Role::new("r-1", validated, None).snapshot();
            prop_assert_eq!(snapshot.get("name"), Some(&Value::String(name)));
            prop_assert_eq!(snapshot.get("description"), Some(&Value::Null));
        }

        #[test]
        fn blank_role_name_is_rejected(name in "[ \t\n]{0,8}") {
            let validated = NonEmptyString::for_field("role name", name);
            prop_assert!(validated.is_err());
        }
    }
}
