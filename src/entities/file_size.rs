use derive_more::Into;
use thiserror::Error;

// 1 GiB
pub const MAX_FILE_SIZE: i64 = 1024 * 1024 * 1024;

#[derive(Error, Debug, Clone)]
pub enum FileSizeTryFromError {
    #[error("File size must be non-negative")]
    NegativeSize,
    #[error("File size exceeds maximum limit")]
    TooLarge,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Into, Default)]
pub struct FileSize(i64);

impl TryFrom<i64> for FileSize {
    type Error = FileSizeTryFromError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if value < 0 {
            Err(FileSizeTryFromError::NegativeSize)
        } else if value > MAX_FILE_SIZE {
            Err(FileSizeTryFromError::TooLarge)
        } else {
            Ok(Self(value))
        }
    }
}

impl TryFrom<u64> for FileSize {
    type Error = FileSizeTryFromError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        i64::try_from(value)
            .map_err(|_| FileSizeTryFromError::TooLarge)
            .and_then(Self::try_from)
    }
}
