use derive_more::{Display, From, Into};

/// Media type as reported by the uploader. Not validated.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Default, From, Into, Display)]
pub struct MediaType(String);

impl MediaType {
    pub fn value(&self) -> &str {
        &self.0
    }
}

impl From<&str> for MediaType {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Hash, Default, From, Into, Display)]
pub struct FileName(String);

impl FileName {
    pub fn value(&self) -> &str {
        &self.0
    }
}

impl From<&str> for FileName {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}
