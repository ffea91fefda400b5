use chrono::{DateTime, Utc};
use sqlx::PgExecutor;

use crate::entities;
use crate::error::{Error, Result};
use crate::queries::document_query::{DocumentModel, DOCUMENT_COLUMNS};

/// Inserts the version-0 placeholder row for a new document.
pub async fn create(
    executor: impl PgExecutor<'_>,
    now: DateTime<Utc>,
    owner: entities::UserId,
) -> Result<entities::Document> {
    let document = entities::Document::placeholder(entities::DocumentId::generate(), owner, now);

    let model = sqlx::query_as::<_, DocumentModel>(&format!(
        r#"
            INSERT INTO documents (id, owner, key, version, size, media_type, file_name, created_at, updated_at)
            VALUES ($1, $2, NULL, $3, $4, $5, $6, $7, $8)
            RETURNING {}
        "#,
        DOCUMENT_COLUMNS
    ))
    .bind(document.id.to_string())
    .bind(document.owner.as_str())
    .bind(i64::from(document.version))
    .bind(i64::from(document.size))
    .bind(document.media_type.value())
    .bind(document.file_name.value())
    .bind(document.created_at)
    .bind(document.updated_at)
    .fetch_one(executor)
    .await?;

    Ok(model.into_entity()?)
}

/// Points the row at a newly promoted blob and bumps its version by one.
/// The update is guarded by the version the caller read, and must touch
/// exactly one row.
pub async fn commit_version(
    executor: impl PgExecutor<'_>,
    now: DateTime<Utc>,
    document: entities::Document,
    key: entities::BlobKey,
    size: entities::FileSize,
    media_type: entities::MediaType,
    file_name: entities::FileName,
) -> Result<entities::Document> {
    let prev_version = document.version;

    let model = sqlx::query_as::<_, DocumentModel>(&format!(
        r#"
            UPDATE documents
                SET
                    key = $1,
                    version = $2,
                    size = $3,
                    media_type = $4,
                    file_name = $5,
                    updated_at = $6
                WHERE
                    id = $7
                    AND
                    version = $8
            RETURNING {}
        "#,
        DOCUMENT_COLUMNS
    ))
    .bind(key.as_str())
    .bind(i64::from(prev_version.next()))
    .bind(i64::from(size))
    .bind(media_type.value())
    .bind(file_name.value())
    .bind(now)
    .bind(document.id.to_string())
    .bind(i64::from(prev_version))
    .fetch_optional(executor)
    .await?;

    let Some(model) = model else {
        return Err(Error::InvariantViolation(format!(
            "no row updated for document {} at version {}, expected: 1",
            document.id, prev_version
        )));
    };

    Ok(model.into_entity()?)
}
