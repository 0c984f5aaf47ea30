//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod in_memory_audit_repository;
mod in_memory_rbac_repository;
mod postgres_audit_repository;
mod postgres_permission_repository;
mod postgres_role_repository;

use sqlx::migrate::Migrator;

pub use in_memory_audit_repository::InMemoryAuditRepository;
pub use in_memory_rbac_repository::InMemoryRbacRepository;
pub use postgres_audit_repository::PostgresAuditRepository;
pub use postgres_permission_repository::PostgresPermissionRepository;
pub use postgres_role_repository::PostgresRoleRepository;

/// Embedded schema migrations for the PostgreSQL adapters.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Parses a stored identifier; ids that are not UUIDs cannot match any row.
fn parse_id(value: &str) -> Option<uuid::Uuid> {
    uuid::Uuid::parse_str(value).ok()
}

/// Returns the SQLSTATE code of a database error, if any.
fn sqlstate(error: &sqlx::Error) -> Option<String> {
    match error {
        sqlx::Error::Database(database_error) => {
            database_error.code().map(|code| code.into_owned())
        }
        _ => None,
    }
}

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";
