use chrono::{DateTime, Utc};
use sqlx::PgExecutor;

use crate::entities;
use crate::error::Result;

/// Adds `permissions` to the grant `grantee` holds on `document_id`,
/// creating the row if needed. Repeated grants are unioned, so a pair never
/// has more than one row. Returns the resulting mask.
pub async fn grant(
    executor: impl PgExecutor<'_>,
    now: DateTime<Utc>,
    document_id: entities::DocumentId,
    grantee: &entities::UserId,
    permissions: entities::Permissions,
) -> Result<entities::Permissions> {
    let bits = sqlx::query_scalar::<_, i64>(
        r#"
            INSERT INTO permissions (document_id, user_id, permissions, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $4)
            ON CONFLICT (document_id, user_id) DO UPDATE
                SET
                    permissions = permissions.permissions | excluded.permissions,
                    updated_at = excluded.updated_at
            RETURNING permissions
        "#,
    )
    .bind(document_id.to_string())
    .bind(grantee.as_str())
    .bind(i64::from(permissions))
    .bind(now)
    .fetch_one(executor)
    .await?;

    let granted = entities::Permissions::try_from(bits).map_err(anyhow::Error::from)?;
    Ok(granted)
}
