use std::str::FromStr;

use anyhow::Context;
use sqlx::PgExecutor;

use crate::entities;
use crate::error::Result;

/// Grant held by `user_id` on `document_id`. No row means no permissions.
pub async fn get_permissions(
    executor: impl PgExecutor<'_>,
    document_id: entities::DocumentId,
    user_id: &entities::UserId,
) -> Result<entities::Permissions> {
    let bits = sqlx::query_scalar::<_, i64>(
        r#"
            SELECT
                permissions
            FROM
                permissions
            WHERE
                document_id = $1
                AND
                user_id = $2
        "#,
    )
    .bind(document_id.to_string())
    .bind(user_id.as_str())
    .fetch_optional(executor)
    .await?;

    match bits {
        Some(bits) => Ok(entities::Permissions::try_from(bits).context("stored permissions")?),
        None => Ok(entities::Permissions::NONE),
    }
}

pub async fn list_shared_document_ids(
    executor: impl PgExecutor<'_>,
    user_id: &entities::UserId,
) -> Result<Vec<entities::DocumentId>> {
    let ids = sqlx::query_scalar::<_, String>(
        r#"
            SELECT
                document_id
            FROM
                permissions
            WHERE
                user_id = $1
            ORDER BY
                document_id
        "#,
    )
    .bind(user_id.as_str())
    .fetch_all(executor)
    .await?;

    let ids = ids
        .iter()
        .map(|id| entities::DocumentId::from_str(id).context("ulid decode error"))
        .collect::<anyhow::Result<Vec<_>>>()?;
    Ok(ids)
}
