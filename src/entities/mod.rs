mod audit_record;
mod blob_key;
mod document;
mod document_id;
mod file_size;
mod media_type;
mod permissions;
mod user_id;
mod version;

pub use audit_record::{AuditAction, AuditOutcome, AuditRecord};
pub use blob_key::BlobKey;
pub use document::Document;
pub use document_id::DocumentId;
pub use file_size::{FileSize, FileSizeTryFromError, MAX_FILE_SIZE};
pub use media_type::{FileName, MediaType};
pub use permissions::{Permissions, PermissionsError};
pub use user_id::UserId;
pub use version::{Version, VersionTryFromError};
