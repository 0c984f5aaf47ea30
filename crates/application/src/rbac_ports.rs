mod audit;
mod permissions;
mod roles;

pub use audit::{AuditEvent, AuditRepository};
pub use permissions::{CreatePermissionInput, NewPermission, PermissionRepository};
pub use roles::{CreateRoleInput, NewRole, PermissionGrantInput, RoleGrantChange, RoleRepository};
