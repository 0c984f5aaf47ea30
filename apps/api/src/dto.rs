use serde::Serialize;

mod rbac;

pub use rbac::{
    AuditEntryResponse, AuditQuery, CreatePermissionRequest, CreateRoleRequest, OkResponse,
    PermissionResponse, RoleResponse,
};

/// Health response payload.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}
