use async_trait::async_trait;
use sqlx::Row;
use sqlx::postgres::PgRow;

use crate::application::repos::{AuditRepo, RepoError};
use crate::domain::audit::AuditLogRecord;

use super::{PostgresRepositories, map_sqlx_error};

fn record_from_row(row: &PgRow) -> Result<AuditLogRecord, RepoError> {
    Ok(AuditLogRecord {
        id: row.try_get("id").map_err(map_sqlx_error)?,
        actor: row.try_get("actor").map_err(map_sqlx_error)?,
        action: row.try_get("action").map_err(map_sqlx_error)?,
        topic: row.try_get("topic").map_err(map_sqlx_error)?,
        payload_text: row.try_get("payload_text").map_err(map_sqlx_error)?,
        created_at: row.try_get("created_at").map_err(map_sqlx_error)?,
    })
}

#[async_trait]
impl AuditRepo for PostgresRepositories {
    async fn append_log(&self, record: AuditLogRecord) -> Result<(), RepoError> {
        sqlx::query(
            "INSERT INTO audit_log (id, actor, action, topic, payload_text, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(record.id)
        .bind(record.actor)
        .bind(record.action)
        .bind(record.topic)
        .bind(record.payload_text)
        .bind(record.created_at)
        .execute(self.pool())
        .await
        .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn list_recent(&self, limit: u32) -> Result<Vec<AuditLogRecord>, RepoError> {
        let rows = sqlx::query(
            "SELECT id, actor, action, topic, payload_text, created_at \
             FROM audit_log ORDER BY created_at DESC LIMIT $1",
        )
        .bind(i64::from(limit))
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        rows.iter().map(record_from_row).collect()
    }
}
