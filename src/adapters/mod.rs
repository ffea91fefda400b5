mod blob_store_impl;

pub use blob_store_impl::BlobStoreImpl;
