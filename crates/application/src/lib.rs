//! Application services and ports.

#![forbid(unsafe_code)]

mod authorization_service;
mod rbac_ports;
mod rbac_service;

pub use authorization_service::{AuthorizationPort, RbacAuthorizationService};
pub use rbac_ports::{
    AuditEvent, AuditRepository, CreatePermissionInput, CreateRoleInput, NewPermission, NewRole,
    PermissionGrantInput, PermissionRepository, RoleGrantChange, RoleRepository,
};
pub use rbac_service::RbacService;
