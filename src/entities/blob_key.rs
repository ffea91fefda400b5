use super::{DocumentId, Version};
use derive_more::{Display, Into};

/// Locator of a promoted blob inside the durable namespace.
#[derive(Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Into, Display)]
pub struct BlobKey(String);

impl BlobKey {
    pub fn new(id: DocumentId, version: Version) -> Self {
        Self(format!("{}_v{}", id, version))
    }

    // for repository
    pub fn from_unchecked(key: String) -> Self {
        Self(key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
