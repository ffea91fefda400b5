use derive_more::{Display, From, Into};
use std::str::FromStr;
use ulid::Ulid;

#[derive(Clone, Debug, Into, From, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Display)]
pub struct DocumentId(Ulid);

impl DocumentId {
    pub fn generate() -> Self {
        Self(Ulid::new())
    }
}

impl FromStr for DocumentId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ulid::from_str(s).map(Self)
    }
}
