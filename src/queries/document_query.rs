use std::str::FromStr;

use anyhow::{ensure, Context};
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgExecutor};

use crate::entities;
use crate::error::Result;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DocumentModel {
    pub id: String,
    pub owner: String,
    pub key: Option<String>,
    pub version: i64,
    pub size: i64,
    pub media_type: String,
    pub file_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DocumentModel {
    pub fn into_entity(self) -> anyhow::Result<entities::Document> {
        let id = entities::DocumentId::from_str(&self.id).context("ulid decode error")?;
        let version =
            entities::Version::try_from(self.version).context("version conversion error")?;
        ensure!(
            version.is_none() == self.key.is_none(),
            "document {} has version {} but key {:?}",
            id,
            version,
            self.key
        );

        Ok(entities::Document {
            id,
            owner: entities::UserId::from(self.owner),
            key: self.key.map(entities::BlobKey::from_unchecked),
            version,
            size: entities::FileSize::try_from(self.size)?,
            media_type: entities::MediaType::from(self.media_type),
            file_name: entities::FileName::from(self.file_name),
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

pub(crate) const DOCUMENT_COLUMNS: &str =
    "id, owner, key, version, size, media_type, file_name, created_at, updated_at";

fn into_entities(models: Vec<DocumentModel>) -> Result<Vec<entities::Document>> {
    let documents = models
        .into_iter()
        .map(|model| model.into_entity())
        .collect::<anyhow::Result<Vec<_>>>()
        .context("convert Document")?;
    Ok(documents)
}

pub async fn get(
    executor: impl PgExecutor<'_>,
    id: entities::DocumentId,
) -> Result<Option<entities::Document>> {
    let model = sqlx::query_as::<_, DocumentModel>(&format!(
        "SELECT {} FROM documents WHERE id = $1",
        DOCUMENT_COLUMNS
    ))
    .bind(id.to_string())
    .fetch_optional(executor)
    .await?;

    Ok(model.map(|model| model.into_entity()).transpose()?)
}

/// Reads the row inside an open transaction and locks it until that
/// transaction ends. Other updaters of the same document wait here, so the
/// version read is the one the caller's update is guarded against. Rows of
/// other documents are not locked.
pub async fn get_for_update(
    trx: &mut PgConnection,
    id: entities::DocumentId,
) -> Result<Option<entities::Document>> {
    let model = sqlx::query_as::<_, DocumentModel>(&format!(
        "SELECT {} FROM documents WHERE id = $1 FOR UPDATE",
        DOCUMENT_COLUMNS
    ))
    .bind(id.to_string())
    .fetch_optional(&mut *trx)
    .await?;

    Ok(model.map(|model| model.into_entity()).transpose()?)
}

pub async fn list_by_owner(
    executor: impl PgExecutor<'_>,
    owner: &entities::UserId,
) -> Result<Vec<entities::Document>> {
    let models = sqlx::query_as::<_, DocumentModel>(&format!(
        "SELECT {} FROM documents WHERE owner = $1 ORDER BY id",
        DOCUMENT_COLUMNS
    ))
    .bind(owner.as_str())
    .fetch_all(executor)
    .await?;

    into_entities(models)
}

pub async fn get_by_ids(
    executor: impl PgExecutor<'_>,
    ids: &[entities::DocumentId],
) -> Result<Vec<entities::Document>> {
    let ids = ids.iter().map(|id| id.to_string()).collect::<Vec<_>>();
    let models = sqlx::query_as::<_, DocumentModel>(&format!(
        "SELECT {} FROM documents WHERE id = ANY($1) ORDER BY id",
        DOCUMENT_COLUMNS
    ))
    .bind(ids.as_slice())
    .fetch_all(executor)
    .await?;

    into_entities(models)
}
