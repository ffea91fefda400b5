use derive_more::{BitAnd, BitOr, BitOrAssign};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Capability set held on a document. A closed set of three flags; unknown
/// bits are rejected at every conversion boundary.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash, BitAnd, BitOr, BitOrAssign)]
pub struct Permissions(u8);

impl Permissions {
    pub const NONE: Permissions = Permissions(0);
    pub const READ: Permissions = Permissions(1);
    pub const WRITE: Permissions = Permissions(2);
    pub const SHARE: Permissions = Permissions(4);
    pub const ALL: Permissions = Permissions(1 | 2 | 4);

    const NAMES: [(Permissions, &'static str); 3] = [
        (Permissions::READ, "READ"),
        (Permissions::WRITE, "WRITE"),
        (Permissions::SHARE, "SHARE"),
    ];

    pub fn from_bits(bits: u8) -> Result<Self, PermissionsError> {
        if bits & !Self::ALL.0 != 0 {
            Err(PermissionsError::UnknownBits(bits))
        } else {
            Ok(Self(bits))
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Every capability in `required` is present.
    pub fn contains(&self, required: Permissions) -> bool {
        (*self & required) == required
    }

    pub fn from_names<I, S>(names: I) -> Result<Self, PermissionsError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names
            .into_iter()
            .map(|name| name.as_ref().parse::<Permissions>())
            .try_fold(Permissions::NONE, |acc, p| p.map(|p| acc | p))
    }

    pub fn names(&self) -> Vec<&'static str> {
        Self::NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect()
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PermissionsError {
    #[error("unknown permission bits: {0:#05b}")]
    UnknownBits(u8),
    #[error("unknown permission name: {0}")]
    UnknownName(String),
}

impl FromStr for Permissions {
    type Err = PermissionsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::NAMES
            .iter()
            .find(|(_, name)| name.eq_ignore_ascii_case(s.trim()))
            .map(|(flag, _)| *flag)
            .ok_or_else(|| PermissionsError::UnknownName(s.to_string()))
    }
}

impl fmt::Display for Permissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "NONE");
        }
        write!(f, "{}", self.names().join("|"))
    }
}

impl TryFrom<i64> for Permissions {
    type Error = PermissionsError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        u8::try_from(value)
            .map_err(|_| PermissionsError::UnknownBits(u8::MAX))
            .and_then(Self::from_bits)
    }
}

impl From<Permissions> for i64 {
    fn from(value: Permissions) -> Self {
        i64::from(value.0)
    }
}
