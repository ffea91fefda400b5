use super::{BlobKey, DocumentId, FileName, FileSize, MediaType, UserId, Version};
use chrono::{DateTime, Utc};

/// Metadata of a document and its current version. Metadata of earlier
/// versions is not kept.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Document {
    pub id: DocumentId,
    pub owner: UserId,
    /// `None` exactly while `version` is zero.
    pub key: Option<BlobKey>,
    pub version: Version,
    pub size: FileSize,
    pub media_type: MediaType,
    pub file_name: FileName,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document {
    pub fn placeholder(id: DocumentId, owner: UserId, now: DateTime<Utc>) -> Self {
        Self {
            id,
            owner,
            key: None,
            version: Version::none(),
            size: FileSize::default(),
            media_type: MediaType::default(),
            file_name: FileName::default(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_committed(&self) -> bool {
        !self.version.is_none()
    }

    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        &self.owner == user_id
    }
}
