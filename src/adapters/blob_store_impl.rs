use std::io;
use std::path::PathBuf;

use tokio::io::{AsyncRead, AsyncReadExt};

use crate::entities::{BlobKey, DocumentId, FileSize, Version, MAX_FILE_SIZE};
use crate::error::{Error, Result};
use crate::ports::{BlobStore, StagedBlob};

/// Filesystem blob store. Staged files live under `staging_root`, promoted
/// blobs under `durable_root`; both must be on the same filesystem so that
/// promotion is a rename.
#[derive(Debug, Clone)]
pub struct BlobStoreImpl {
    durable_root: PathBuf,
    staging_root: PathBuf,
}

impl BlobStoreImpl {
    pub async fn new(
        durable_root: impl Into<PathBuf>,
        staging_root: impl Into<PathBuf>,
    ) -> Result<Self> {
        let durable_root = durable_root.into();
        let staging_root = staging_root.into();
        tokio::fs::create_dir_all(&durable_root).await?;
        tokio::fs::create_dir_all(&staging_root).await?;

        Ok(Self {
            durable_root,
            staging_root,
        })
    }

    pub fn path_of(&self, key: &BlobKey) -> PathBuf {
        self.durable_root.join(key.as_str())
    }
}

impl BlobStore for BlobStoreImpl {
    type Reader = tokio::fs::File;

    async fn stage<R>(&self, document_id: DocumentId, content: R) -> Result<StagedBlob>
    where
        R: AsyncRead + Unpin,
    {
        let prefix = format!("{}_", document_id);
        let staging_root = self.staging_root.clone();
        let temp = tokio::task::spawn_blocking(move || {
            tempfile::Builder::new()
                .prefix(&prefix)
                .tempfile_in(staging_root)
        })
        .await
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))??;
        // the TempPath removes the file if anything below fails or the
        // future is dropped
        let (file, path) = temp.into_parts();
        let mut file = tokio::fs::File::from_std(file);

        let mut limited = content.take(MAX_FILE_SIZE as u64 + 1);
        let written = tokio::io::copy(&mut limited, &mut file).await?;
        file.sync_all().await?;
        drop(file);

        let size = FileSize::try_from(written)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        log::debug!(
            "staged {} bytes for document {} at {}",
            written,
            document_id,
            path.display()
        );

        Ok(StagedBlob { path, size })
    }

    async fn promote(
        &self,
        staged: StagedBlob,
        document_id: DocumentId,
        version: Version,
    ) -> Result<BlobKey> {
        let key = BlobKey::new(document_id, version);
        let target = self.path_of(&key);
        let StagedBlob { path, .. } = staged;

        tokio::task::spawn_blocking(move || path.persist_noclobber(&target))
            .await
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?
            .map_err(|e| e.error)?;

        Ok(key)
    }

    async fn remove_orphan(&self, key: &BlobKey) -> Result<()> {
        match tokio::fs::remove_file(self.path_of(key)).await {
            Ok(()) => {
                log::warn!("removed orphaned blob {}", key);
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::Io(e)),
        }
    }

    async fn open(&self, key: &BlobKey) -> Result<Self::Reader> {
        match tokio::fs::File::open(self.path_of(key)).await {
            Ok(file) => Ok(file),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(Error::NotFound(format!("blob {}", key)))
            }
            Err(e) => Err(Error::Io(e)),
        }
    }
}
