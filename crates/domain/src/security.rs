use serde::{Deserialize, Serialize};

/// Administrative role that bypasses per-resource manage grants.
pub const ADMIN_ROLE: &str = "admin";

/// Action granting write access to an RBAC collection.
pub const MANAGE_ACTION: &str = "manage";

/// RBAC collections guarded by a manage grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ManagedResource {
    /// Role definitions.
    Roles,
    /// Permission definitions and role grants.
    Permissions,
}

impl ManagedResource {
    /// Returns the resource name used in permission rows.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Roles => "roles",
            Self::Permissions => "permissions",
        }
    }
}
