use crate::entities::UserId;
use crate::error::Result;
use std::future::Future;

#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// Resolves request credentials to the acting user. Fails with
/// `Error::Unauthenticated` when they do not match.
pub trait Authenticator {
    fn authenticate(&self, credentials: &Credentials) -> impl Future<Output = Result<UserId>>;
}
