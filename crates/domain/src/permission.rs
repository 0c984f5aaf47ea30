use aula_core::{AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};

/// Validated `(action, resource)` pair identifying a capability.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PermissionKey {
    action: NonEmptyString,
    resource: NonEmptyString,
}

impl PermissionKey {
    /// Creates a key, rejecting blank action or resource values.
    pub fn new(action: impl Into<String>, resource: impl Into<String>) -> AppResult<Self> {
        Ok(Self {
            action: NonEmptyString::for_field("permission action", action)?,
            resource: NonEmptyString::for_field("permission resource", resource)?,
        })
    }

    /// Returns the action part.
    #[must_use]
    pub fn action(&self) -> &str {
        self.action.as_str()
    }

    /// Returns the resource part.
    #[must_use]
    pub fn resource(&self) -> &str {
        self.resource.as_str()
    }
}

/// A stored `(action, resource)` capability grant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    /// Stable permission identifier.
    pub id: String,
    /// Granted action, e.g. `manage`.
    pub action: String,
    /// Target resource, e.g. `roles`.
    pub resource: String,
    /// Optional human description.
    pub description: Option<String>,
}

impl Permission {
    /// Returns the display name `action:resource`.
    #[must_use]
    pub fn name(&self) -> String {
        format!("{}:{}", self.action, self.resource)
    }

    /// Returns whether this permission grants `action` on `resource`.
    #[must_use]
    pub fn grants(&self, action: &str, resource: &str) -> bool {
        self.action == action && self.resource == resource
    }

    /// Returns the compact reference embedded in role projections.
    #[must_use]
    pub fn to_ref(&self) -> PermissionRef {
        PermissionRef {
            id: self.id.clone(),
            name: self.name(),
        }
    }
}

/// Compact permission reference carried by a role.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PermissionRef {
    /// Permission identifier.
    pub id: String,
    /// Permission display name.
    pub name: String,
}
