use crate::entities::{DocumentId, Permissions, UserId};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{actor} is not allowed {required} on document {document}")]
    Denied {
        actor: UserId,
        document: DocumentId,
        required: Permissions,
    },
    #[error("not found: {0}")]
    NotFound(String),
    #[error("invalid share target: {0}")]
    InvalidTarget(String),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("invalid permissions: {0}")]
    InvalidPermissions(String),
    #[error("invariant violated: {0}")]
    InvariantViolation(String),
    #[error("blob I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("unauthenticated")]
    Unauthenticated,
    #[error("operation cancelled")]
    Cancelled,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    pub fn document_not_found(id: DocumentId) -> Self {
        Error::NotFound(format!("document {}", id))
    }

    pub fn is_denied(&self) -> bool {
        matches!(self, Error::Denied { .. })
    }
}
