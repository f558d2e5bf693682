//! Storage module for report photos
//!
//! Provides the [`BlobStore`] capability used by the submission flow and a
//! MinIO/S3-compatible implementation of it.

mod minio_client;

pub use minio_client::MinIOClient;

use async_trait::async_trait;

use crate::core::error::Result;

/// Key-addressed binary storage.
///
/// Keys are unique per submission, so implementations never need locking.
#[async_trait]
pub trait BlobStore: Send + Sync + 'static {
    /// Stores `data` under `key`.
    ///
    /// Must fail instead of replacing an object that already exists.
    async fn upload(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<()>;

    /// Deletes every key in `keys`. Missing objects are not an error.
    async fn delete(&self, keys: &[String]) -> Result<()>;

    /// Returns a credential-free read URL for `key`, valid for `ttl_secs`.
    async fn create_signed_url(&self, key: &str, ttl_secs: u32) -> Result<String>;
}
