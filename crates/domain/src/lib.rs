//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod audit;
mod permission;
mod role;
mod security;

pub use audit::{AuditAction, AuditEntry, AuditSnapshot};
pub use permission::{Permission, PermissionKey, PermissionRef};
pub use role::Role;
pub use security::{ADMIN_ROLE, MANAGE_ACTION, ManagedResource};
