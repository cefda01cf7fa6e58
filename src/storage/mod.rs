//! The object-storage collaborator.

mod client;

use std::sync::Arc;

use async_trait::async_trait;

pub use client::{HttpBlobStore, DEFAULT_EXPIRY_SECS, DEFAULT_URL as DEFAULT_STORAGE_URL};

use crate::error::ClientError;

/// Binary blobs stored and retrieved by key.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Upload `bytes` under `key`, replacing any blob already stored there.
    async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: Option<&str>,
    ) -> Result<(), ClientError>;

    /// Resolve a time-limited display URL for the blob at `key`.
    async fn get_url(&self, key: &str) -> Result<String, ClientError>;

    async fn remove(&self, key: &str) -> Result<(), ClientError>;
}

#[async_trait]
impl<T: BlobStore + ?Sized> BlobStore for Arc<T> {
    async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: Option<&str>,
    ) -> Result<(), ClientError> {
        (**self).put(key, bytes, content_type).await
    }

    async fn get_url(&self, key: &str) -> Result<String, ClientError> {
        (**self).get_url(key).await
    }

    async fn remove(&self, key: &str) -> Result<(), ClientError> {
        (**self).remove(key).await
    }
}
