use crate::entities::{BlobKey, DocumentId, FileSize, Version};
use crate::error::Result;
use std::future::Future;
use std::path::Path;
use tokio::io::AsyncRead;

/// Content copied into the staging area but not yet visible under the
/// durable namespace. Dropping it deletes the staged file.
#[derive(Debug)]
pub struct StagedBlob {
    pub(crate) path: tempfile::TempPath,
    pub size: FileSize,
}

impl StagedBlob {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

pub trait BlobStore {
    type Reader: AsyncRead + Unpin + Send;

    /// Copy `content` to completion into a private staging location.
    fn stage<R>(
        &self,
        document_id: DocumentId,
        content: R,
    ) -> impl Future<Output = Result<StagedBlob>>
    where
        R: AsyncRead + Unpin;

    /// Move a staged blob to the location derived from `(document_id,
    /// version)`. Never overwrites an existing blob.
    fn promote(
        &self,
        staged: StagedBlob,
        document_id: DocumentId,
        version: Version,
    ) -> impl Future<Output = Result<BlobKey>>;

    /// Deletes a durable blob that no committed version refers to. A missing
    /// blob is not an error.
    fn remove_orphan(&self, key: &BlobKey) -> impl Future<Output = Result<()>>;

    fn open(&self, key: &BlobKey) -> impl Future<Output = Result<Self::Reader>>;
}
