//! In-memory object store.

use std::sync::atomic::{AtomicU64, Ordering};

use bytes::Bytes;
use dashmap::DashMap;
use tracing::trace;

use super::ObjectStore;
use crate::error::StoreError;

/// An object held by [`InMemoryObjectStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// Object body.
    pub body: Bytes,
    /// MIME type recorded at write time.
    pub content_type: String,
}

/// Thread-safe in-memory store keyed by `(bucket, key)`.
///
/// Counts writes made through [`ObjectStore::put`] so tests can assert that
/// an invocation wrote nothing.
///
/// # Examples
///
/// ```
/// use bytes::Bytes;
/// use imgflow_core::store::{InMemoryObjectStore, ObjectStore};
///
/// # tokio_test::block_on(async {
/// let store = InMemoryObjectStore::new();
/// store.insert("photos", "original/a.txt", Bytes::from("hello"), "text/plain");
///
/// let body = store.get("photos", "original/a.txt").await.unwrap();
/// assert_eq!(body.as_ref(), b"hello");
/// assert_eq!(store.put_count(), 0);
/// # });
/// ```
#[derive(Debug, Default)]
pub struct InMemoryObjectStore {
    objects: DashMap<(String, String), StoredObject>,
    puts: AtomicU64,
}

impl InMemoryObjectStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an object without counting it as a write.
    pub fn insert(&self, bucket: &str, key: &str, body: Bytes, content_type: &str) {
        self.objects.insert(
            (bucket.to_owned(), key.to_owned()),
            StoredObject {
                body,
                content_type: content_type.to_owned(),
            },
        );
    }

    /// Remove an object, returning it if it existed.
    pub fn remove(&self, bucket: &str, key: &str) -> Option<StoredObject> {
        self.objects
            .remove(&(bucket.to_owned(), key.to_owned()))
            .map(|(_, object)| object)
    }

    /// Look up an object.
    #[must_use]
    pub fn object(&self, bucket: &str, key: &str) -> Option<StoredObject> {
        self.objects
            .get(&(bucket.to_owned(), key.to_owned()))
            .map(|entry| entry.value().clone())
    }

    /// Sorted keys stored in `bucket`.
    #[must_use]
    pub fn keys(&self, bucket: &str) -> Vec<String> {
        let mut keys: Vec<String> = self
            .objects
            .iter()
            .filter(|entry| entry.key().0 == bucket)
            .map(|entry| entry.key().1.clone())
            .collect();
        keys.sort();
        keys
    }

    /// Number of writes made through [`ObjectStore::put`].
    #[must_use]
    pub fn put_count(&self) -> u64 {
        self.puts.load(Ordering::Relaxed)
    }

    /// Number of stored objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the store is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

#[async_trait::async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn get(&self, bucket: &str, key: &str) -> Result<Bytes, StoreError> {
        self.object(bucket, key)
            .map(|object| object.body)
            .ok_or_else(|| StoreError::NotFound {
                bucket: bucket.to_owned(),
                key: key.to_owned(),
            })
    }

    async fn put(
        &self,
        bucket: &str,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> Result<(), StoreError> {
        trace!(bucket, key, size = body.len(), "storing object");
        self.insert(bucket, key, body, content_type);
        self.puts.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
