//! External cancellation of engine calls.
//!
//! Engine futures are safe to drop at any await point: an open metadata
//! transaction rolls back when its handle is dropped and a staged blob
//! deletes itself. These helpers turn a token or a deadline into such a
//! drop.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::error::{Error, Result};

pub async fn cancellable<F, T>(token: &CancellationToken, operation: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    tokio::select! {
        biased;
        _ = token.cancelled() => Err(Error::Cancelled),
        result = operation => result,
    }
}

pub async fn with_deadline<F, T>(deadline: Duration, operation: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    tokio::time::timeout(deadline, operation)
        .await
        .map_err(|_| Error::Cancelled)?
}
