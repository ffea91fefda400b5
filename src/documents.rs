//! Document upload, update, listing and retrieval.
//!
//! Content is always staged before the metadata transaction opens. A new
//! version is promoted only while the document row is locked, and the row
//! update that publishes it is committed in the same transaction, so two
//! updaters of one document can never commit the same version number. The
//! lock covers that one row; other documents proceed in parallel. A
//! blob promoted by a transaction that later fails is left behind as an
//! orphan; the previous version stays current.

use chrono::Utc;
use sqlx::PgPool;
use tokio::io::AsyncRead;

use crate::access_control::AccessControl;
use crate::commands::documents_command;
use crate::entities::{
    BlobKey, Document, DocumentId, FileName, MediaType, Permissions, UserId,
};
use crate::error::{Error, Result};
use crate::ports::{BlobStore, StagedBlob};
use crate::queries::document_query;

#[derive(Debug, Clone)]
pub struct DocumentEngine<B> {
    pool: PgPool,
    access_control: AccessControl,
    blob_store: B,
}

impl<B> DocumentEngine<B>
where
    B: BlobStore,
{
    pub fn new(pool: PgPool, blob_store: B) -> Self {
        Self {
            access_control: AccessControl::new(pool.clone()),
            pool,
            blob_store,
        }
    }

    /// Creates a document owned by `actor` and commits `content` as its
    /// first version.
    pub async fn upload<R>(
        &self,
        actor: &UserId,
        content: R,
        media_type: MediaType,
        file_name: FileName,
    ) -> Result<Document>
    where
        R: AsyncRead + Unpin,
    {
        let document = documents_command::create(&self.pool, Utc::now(), actor.clone()).await?;
        log::debug!("created document {} for {}", document.id, actor);

        let staged = self.blob_store.stage(document.id, content).await?;
        self.replace(document.id, staged, media_type, file_name)
            .await
    }

    /// Commits `content` as the next version of an existing document.
    pub async fn update<R>(
        &self,
        actor: &UserId,
        document_id: DocumentId,
        content: R,
        media_type: MediaType,
        file_name: FileName,
    ) -> Result<Document>
    where
        R: AsyncRead + Unpin,
    {
        let document = self.load(document_id).await?;
        self.access_control
            .authorize(actor, &document, Permissions::WRITE)
            .await?;

        let staged = self.blob_store.stage(document.id, content).await?;
        self.replace(document.id, staged, media_type, file_name)
            .await
    }

    pub async fn list(&self, actor: &UserId) -> Result<Vec<Document>> {
        document_query::list_by_owner(&self.pool, actor).await
    }

    /// Documents other users have granted `actor` access to. Order is
    /// unspecified.
    pub async fn list_shared(&self, actor: &UserId) -> Result<Vec<Document>> {
        let ids = self.access_control.shared_document_ids(actor).await?;
        document_query::get_by_ids(&self.pool, &ids).await
    }

    /// Metadata of a document `actor` may read.
    pub async fn get(&self, actor: &UserId, document_id: DocumentId) -> Result<Document> {
        let document = self.load(document_id).await?;
        self.access_control
            .authorize(actor, &document, Permissions::READ)
            .await?;
        Ok(document)
    }

    /// Metadata and content of the current version. The metadata is read
    /// before the blob is opened; since promoted blobs are never rewritten,
    /// the stream always holds the bytes of the version described.
    pub async fn open(
        &self,
        actor: &UserId,
        document_id: DocumentId,
    ) -> Result<(Document, B::Reader)> {
        let document = self.get(actor, document_id).await?;
        let key = document.key.clone().ok_or_else(|| {
            Error::NotFound(format!("document {} has no committed content", document_id))
        })?;
        let reader = self.blob_store.open(&key).await?;
        Ok((document, reader))
    }

    /// Shares `document_id` with `grantee`. See [`AccessControl::share`].
    pub async fn share(
        &self,
        actor: &UserId,
        document_id: DocumentId,
        grantee: &UserId,
        permissions: Permissions,
    ) -> Result<Permissions> {
        let document = self.load(document_id).await?;
        self.access_control
            .share(actor, &document, grantee, permissions)
            .await
    }

    async fn load(&self, document_id: DocumentId) -> Result<Document> {
        document_query::get(&self.pool, document_id)
            .await?
            .ok_or_else(|| Error::document_not_found(document_id))
    }

    async fn replace(
        &self,
        document_id: DocumentId,
        staged: StagedBlob,
        media_type: MediaType,
        file_name: FileName,
    ) -> Result<Document> {
        let mut trx = self.pool.begin().await?;
        let current = document_query::get_for_update(&mut *trx, document_id)
            .await?
            .ok_or_else(|| Error::document_not_found(document_id))?;

        let next_version = current.version.next();
        // nothing committed ever pointed at the next version's key, so a
        // blob found there is left over from a failed commit
        let next_key = BlobKey::new(document_id, next_version);
        self.blob_store.remove_orphan(&next_key).await?;

        let size = staged.size;
        let key = self
            .blob_store
            .promote(staged, document_id, next_version)
            .await?;

        let committed = documents_command::commit_version(
            &mut *trx,
            Utc::now(),
            current,
            key.clone(),
            size,
            media_type,
            file_name,
        )
        .await
        .map_err(|e| orphaned(&key, e))?;
        trx.commit().await.map_err(|e| orphaned(&key, e.into()))?;

        log::info!(
            "committed document {} version {} ({} bytes)",
            committed.id,
            committed.version,
            i64::from(committed.size)
        );
        Ok(committed)
    }
}

fn orphaned(key: &BlobKey, err: Error) -> Error {
    log::warn!("blob {} left orphaned: {}", key, err);
    err
}
