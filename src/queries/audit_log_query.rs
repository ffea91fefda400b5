use std::str::FromStr;

use anyhow::Context;
use chrono::{DateTime, Utc};
use sqlx::PgExecutor;

use crate::entities;
use crate::error::Result;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AuditRecordModel {
    pub id: i64,
    pub user_id: String,
    pub document_id: String,
    pub action: String,
    pub created_at: DateTime<Utc>,
}

impl AuditRecordModel {
    pub fn into_entity(self) -> anyhow::Result<entities::AuditRecord> {
        Ok(entities::AuditRecord {
            id: self.id,
            user_id: entities::UserId::from(self.user_id),
            document_id: entities::DocumentId::from_str(&self.document_id)
                .context("ulid decode error")?,
            action: self.action,
            created_at: self.created_at,
        })
    }
}

/// Audit trail of one document, oldest first.
pub async fn list_by_document(
    executor: impl PgExecutor<'_>,
    document_id: entities::DocumentId,
) -> Result<Vec<entities::AuditRecord>> {
    let models = sqlx::query_as::<_, AuditRecordModel>(
        r#"
            SELECT
                id,
                user_id,
                document_id,
                action,
                created_at
            FROM
                audit_log
            WHERE
                document_id = $1
            ORDER BY
                id
        "#,
    )
    .bind(document_id.to_string())
    .fetch_all(executor)
    .await?;

    let records = models
        .into_iter()
        .map(|model| model.into_entity())
        .collect::<anyhow::Result<Vec<_>>>()
        .context("convert AuditRecord")?;
    Ok(records)
}
