use derive_more::Into;
use std::fmt;
use thiserror::Error;

#[derive(Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Into, Copy)]
pub struct Version(i64);

impl Version {
    // record exists but no content has been committed yet
    pub fn none() -> Self {
        Self(0)
    }

    pub fn is_none(&self) -> bool {
        self.0 == 0
    }

    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Error, Debug, Clone)]
pub enum VersionTryFromError {
    #[error("Version must be non negative")]
    NegativeInteger,
}

impl TryFrom<i64> for Version {
    type Error = VersionTryFromError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if value >= 0 {
            Ok(Self(value))
        } else {
            Err(VersionTryFromError::NegativeInteger)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_increments_by_one() {
        let v = Version::none();
        assert!(v.is_none());
        assert_eq!(i64::from(v.next()), 1);
        assert_eq!(i64::from(v.next().next()), 2);
        assert!(!v.next().is_none());
    }

    #[test]
    fn rejects_negative() {
        assert!(Version::try_from(-1).is_err());
        assert_eq!(Version::try_from(3).unwrap().to_string(), "3");
    }
}
