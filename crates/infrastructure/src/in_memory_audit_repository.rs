use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use aula_application::{AuditEvent, AuditRepository};
use aula_core::AppResult;
use aula_domain::AuditEntry;

/// In-memory append-only audit log.
#[derive(Debug, Default)]
pub struct InMemoryAuditRepository {
    entries: RwLock<Vec<AuditEntry>>,
}

impl InMemoryAuditRepository {
    /// Creates an empty audit log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AuditRepository for InMemoryAuditRepository {
    async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
        self.entries.write().await.push(AuditEntry {
            id: Uuid::new_v4().to_string(),
            actor_id: event.actor_id,
            role_id: event.role_id,
            action: event.action,
            timestamp: event.timestamp,
            before: event.before,
            after: event.after,
            reason: event.reason,
        });
        Ok(())
    }

    async fn list_entries_for_role(&self, role_id: &str) -> AppResult<Vec<AuditEntry>> {
        let entries = self.entries.read().await;
        let mut matching: Vec<AuditEntry> = entries
            .iter()
            .rev()
            .filter(|entry| entry.role_id == role_id)
            .cloned()
            .collect();
        // Stable sort keeps newest-insert-first among equal timestamps.
        matching.sort_by(|left, right| right.timestamp.cmp(&left.timestamp));
        Ok(matching)
    }
}
