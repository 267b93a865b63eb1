//! Object store abstraction.
//!
//! The worker talks to storage only through [`ObjectStore`]. Two adapters are
//! provided: [`S3ObjectStore`] for S3-compatible services and
//! [`InMemoryObjectStore`] for tests and local runs.
//!
//! # Object safety
//!
//! The trait uses `#[async_trait]` so it can be held as `Arc<dyn ObjectStore>`.

mod memory;
mod s3;

use bytes::Bytes;

pub use memory::{InMemoryObjectStore, StoredObject};
pub use s3::S3ObjectStore;

use crate::error::StoreError;

/// Read and write access to an object store.
#[async_trait::async_trait]
pub trait ObjectStore: Send + Sync + std::fmt::Debug {
    /// Read the full body of `bucket/key`.
    ///
    /// Returns [`StoreError::NotFound`] when the object does not exist.
    async fn get(&self, bucket: &str, key: &str) -> Result<Bytes, StoreError>;

    /// Write `body` to `bucket/key`, replacing any existing object.
    async fn put(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> Result<(), StoreError>;
}
