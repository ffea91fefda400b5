mod authenticator;
mod blob_store;

pub use authenticator::*;
pub use blob_store::*;
