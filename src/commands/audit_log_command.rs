use chrono::{DateTime, Utc};
use sqlx::PgExecutor;

use crate::entities;
use crate::error::{Error, Result};

pub async fn append(
    executor: impl PgExecutor<'_>,
    now: DateTime<Utc>,
    user_id: &entities::UserId,
    document_id: entities::DocumentId,
    action: &entities::AuditAction,
) -> Result<()> {
    let result = sqlx::query(
        r#"
            INSERT INTO audit_log (user_id, document_id, action, created_at)
            VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(user_id.as_str())
    .bind(document_id.to_string())
    .bind(action.to_string())
    .bind(now)
    .execute(executor)
    .await?;

    if result.rows_affected() != 1 {
        return Err(Error::InvariantViolation(format!(
            "unexpected number of audit rows written: {}",
            result.rows_affected()
        )));
    }

    Ok(())
}
