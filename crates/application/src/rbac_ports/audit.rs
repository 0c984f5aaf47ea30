use async_trait::async_trait;
use chrono::{DateTime, Utc};

use aula_core::AppResult;
use aula_domain::{AuditAction, AuditEntry, AuditSnapshot};

/// Audit entry emitted by a mutating use case.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEvent {
    /// Subject that performed the action.
    pub actor_id: String,
    /// Role affected by the action.
    pub role_id: String,
    /// Recorded action.
    pub action: AuditAction,
    /// Time the action completed.
    pub timestamp: DateTime<Utc>,
    /// State before the change.
    pub before: Option<AuditSnapshot>,
    /// State after the change.
    pub after: Option<AuditSnapshot>,
    /// Optional free-form reason.
    pub reason: Option<String>,
}

/// Append-only audit log port.
#[async_trait]
pub trait AuditRepository: Send + Sync {
    /// Appends one immutable entry.
    async fn append_event(&self, event: AuditEvent) -> AppResult<()>;

    /// Lists entries for a role, newest first.
    async fn list_entries_for_role(&self, role_id: &str) -> AppResult<Vec<AuditEntry>>;
}
