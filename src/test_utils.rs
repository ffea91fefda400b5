use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use sqlx::PgPool;
use tempfile::TempDir;
use tokio::io::{AsyncRead, AsyncReadExt, ReadBuf};

use crate::access_control::AccessControl;
use crate::adapters::BlobStoreImpl;
use crate::commands::documents_command;
use crate::documents::DocumentEngine;
use crate::entities;
use crate::ports::{BlobStore, StagedBlob};

pub struct TestContext {
    pub dir: TempDir,
    pub pool: PgPool,
    pub blob_store: BlobStoreImpl,
}

impl TestContext {
    /// Wraps a freshly migrated database handed out by `#[sqlx::test]` and
    /// a blob store under a private temp dir.
    pub async fn new(pool: PgPool) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let blob_store = BlobStoreImpl::new(dir.path().join("files"), dir.path().join("staging"))
            .await
            .unwrap();

        Self {
            dir,
            pool,
            blob_store,
        }
    }

    pub fn access_control(&self) -> AccessControl {
        AccessControl::new(self.pool.clone())
    }

    pub fn engine(&self) -> DocumentEngine<BlobStoreImpl> {
        DocumentEngine::new(self.pool.clone(), self.blob_store.clone())
    }

    pub fn faulty_engine(&self, fault: Fault) -> DocumentEngine<FaultyBlobStore> {
        let blob_store = FaultyBlobStore {
            inner: self.blob_store.clone(),
            fault,
        };
        DocumentEngine::new(self.pool.clone(), blob_store)
    }

    pub async fn placeholder(&self, owner: &str) -> entities::Document {
        documents_command::create(&self.pool, chrono::Utc::now(), entities::UserId::from(owner))
            .await
            .unwrap()
    }

    pub fn staged_files(&self) -> usize {
        std::fs::read_dir(self.dir.path().join("staging"))
            .unwrap()
            .count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    FailPromote,
    StallPromote,
}

/// Delegates to a real blob store but misbehaves on promotion.
#[derive(Debug, Clone)]
pub struct FaultyBlobStore {
    pub inner: BlobStoreImpl,
    pub fault: Fault,
}

impl BlobStore for FaultyBlobStore {
    type Reader = <BlobStoreImpl as BlobStore>::Reader;

    async fn stage<R>(
        &self,
        document_id: entities::DocumentId,
        content: R,
    ) -> crate::Result<StagedBlob>
    where
        R: AsyncRead + Unpin,
    {
        self.inner.stage(document_id, content).await
    }

    async fn promote(
        &self,
        staged: StagedBlob,
        document_id: entities::DocumentId,
        version: entities::Version,
    ) -> crate::Result<entities::BlobKey> {
        match self.fault {
            Fault::FailPromote => {
                drop(staged);
                Err(io::Error::new(io::ErrorKind::Other, "rename failed").into())
            }
            Fault::StallPromote => {
                std::future::pending::<()>().await;
                self.inner.promote(staged, document_id, version).await
            }
        }
    }

    async fn remove_orphan(&self, key: &entities::BlobKey) -> crate::Result<()> {
        self.inner.remove_orphan(key).await
    }

    async fn open(&self, key: &entities::BlobKey) -> crate::Result<Self::Reader> {
        self.inner.open(key).await
    }
}

/// Yields one chunk and then never completes.
pub struct StallingReader {
    sent: bool,
}

impl StallingReader {
    pub fn new() -> Self {
        Self { sent: false }
    }
}

impl AsyncRead for StallingReader {
    fn poll_read(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        if self.sent {
            Poll::Pending
        } else {
            self.sent = true;
            buf.put_slice(b"partial");
            Poll::Ready(Ok(()))
        }
    }
}

pub struct FailingReader;

impl AsyncRead for FailingReader {
    fn poll_read(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        _buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Poll::Ready(Err(io::Error::new(io::ErrorKind::BrokenPipe, "client went away")))
    }
}

pub async fn read_all(mut reader: impl AsyncRead + Unpin) -> Vec<u8> {
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf).await.unwrap();
    buf
}
