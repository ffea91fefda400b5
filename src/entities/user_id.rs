use derive_more::{Display, From, Into};

#[derive(Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, From, Into, Display)]
pub struct UserId(String);

impl From<&str> for UserId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl UserId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}
