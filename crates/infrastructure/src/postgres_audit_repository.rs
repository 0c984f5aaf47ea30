use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use tracing::debug;
use uuid::Uuid;

use aula_application::{AuditEvent, AuditRepository};
use aula_core::{AppError, AppResult};
use aula_domain::{AuditAction, AuditEntry, AuditSnapshot};

/// PostgreSQL-backed append-only audit log for role changes.
#[derive(Clone)]
pub struct PostgresAuditRepository {
    pool: PgPool,
}

impl PostgresAuditRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct AuditEntryRow {
    id: Uuid,
    actor_id: String,
    role_id: String,
    action: String,
    created_at: DateTime<Utc>,
    before: Option<Value>,
    after: Option<Value>,
    reason: Option<String>,
}

impl TryFrom<AuditEntryRow> for AuditEntry {
    type Error = AppError;

    fn try_from(row: AuditEntryRow) -> Result<Self, Self::Error> {
        let action = AuditAction::from_str(row.action.as_str()).map_err(|error| {
            AppError::Internal(format!(
                "invalid stored audit action for entry '{}': {error}",
                row.id
            ))
        })?;

        Ok(Self {
            id: row.id.to_string(),
            actor_id: row.actor_id,
            role_id: row.role_id,
            action,
            timestamp: row.created_at,
            before: row.before.map(into_snapshot).transpose()?,
            after: row.after.map(into_snapshot).transpose()?,
            reason: row.reason,
        })
    }
}

fn into_snapshot(value: Value) -> AppResult<AuditSnapshot> {
    match value {
        Value::Object(snapshot) => Ok(snapshot),
        other => Err(AppError::Internal(format!(
            "stored audit snapshot is not an object: {other}"
        ))),
    }
}

#[async_trait]
impl AuditRepository for PostgresAuditRepository {
    async fn append_event(&self, event: AuditEvent) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO rbac_audit_entries (
                actor_id,
                role_id,
                action,
                created_at,
                before,
                after,
                reason
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(event.actor_id.as_str())
        .bind(event.role_id.as_str())
        .bind(event.action.as_str())
        .bind(event.timestamp)
        .bind(event.before.map(Json))
        .bind(event.after.map(Json))
        .bind(event.reason)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to append audit entry: {error}")))?;

        Ok(())
    }

    async fn list_entries_for_role(&self, role_id: &str) -> AppResult<Vec<AuditEntry>> {
        let rows = sqlx::query_as::<_, AuditEntryRow>(
            r#"
            SELECT id, actor_id, role_id, action, created_at, before, after, reason
            FROM rbac_audit_entries
            WHERE role_id = $1
            ORDER BY created_at DESC, sequence DESC
            "#,
        )
        .bind(role_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list audit entries: {error}")))?;

        debug!(role_id, entries = rows.len(), "loaded role audit entries");
        rows.into_iter().map(AuditEntry::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use serde_json::json;
    use sqlx::PgPool;
    use sqlx::postgres::PgPoolOptions;

    use aula_application::{AuditEvent, AuditRepository};
    use aula_domain::AuditAction;

    use super::{PostgresAuditRepository, into_snapshot};
    use crate::MIGRATOR;

    async fn test_pool() -> Option<PgPool> {
        let Ok(database_url) = std::env::var("DATABASE_URL") else {
            return None;
        };

        let pool = match PgPoolOptions::new()
            .max_connections(2)
            .connect(database_url.as_str())
            .await
        {
            Ok(pool) => pool,
            Err(error) => panic!("failed to connect to DATABASE_URL in test: {error}"),
        };

        if let Err(error) = MIGRATOR.run(&pool).await {
            panic!("failed to run migrations for postgres audit tests: {error}");
        }

        Some(pool)
    }

    #[test]
    fn non_object_snapshot_is_rejected() {
        assert!(into_snapshot(json!(["id"])).is_err());
        assert!(into_snapshot(json!({ "id": "r1" })).is_ok());
    }

    #[tokio::test]
    async fn entries_round_trip_newest_first() {
        let Some(pool) = test_pool().await else {
            return;
        };

        let repository = PostgresAuditRepository::new(pool);
        let role_id = uuid::Uuid::new_v4().to_string();
        let stored = json!({ "id": role_id, "name": "docente", "description": null });
        let snapshot = into_snapshot(stored).unwrap_or_default();
        let created_at = Utc::now() - Duration::seconds(5);

        let created = repository
            .append_event(AuditEvent {
                actor_id: "admin-1".to_owned(),
                role_id: role_id.clone(),
                action: AuditAction::CreateRole,
                timestamp: created_at,
                before: None,
                after: Some(snapshot.clone()),
                reason: Some("Role created".to_owned()),
            })
            .await;
        assert!(created.is_ok());

        let deleted = repository
            .append_event(AuditEvent {
                actor_id: "admin-1".to_owned(),
                role_id: role_id.clone(),
                action: AuditAction::DeleteRole,
                timestamp: Utc::now(),
                before: Some(snapshot.clone()),
                after: None,
                reason: Some("Role deleted".to_owned()),
            })
            .await;
        assert!(deleted.is_ok());

        let entries = repository
            .list_entries_for_role(role_id.as_str())
            .await
            .unwrap_or_default();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].action, AuditAction::DeleteRole);
        assert_eq!(entries[0].before.as_ref(), Some(&snapshot));
        assert_eq!(entries[1].action, AuditAction::CreateRole);
        assert_eq!(entries[1].after.as_ref(), Some(&snapshot));
        assert_eq!(entries[1].reason.as_deref(), Some("Role created"));
    }
}
