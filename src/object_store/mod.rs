mod local;

pub use local::LocalStore;

use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use tokio::io::AsyncRead;

#[derive(Debug, Error)]
pub enum ObjectStoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Object not found: {0}")]
    NotFound(String),
    #[error("Object already exists: {0}")]
    AlreadyExists(String),
    #[error("Invalid object key: {0:?}")]
    InvalidKey(String),
}

/// A length-limited reader over part of an object.
pub type ObjectReader = Pin<Box<dyn AsyncRead + Send>>;

/// Flat keyspace of immutable blobs. Keys are file ids; the store knows
/// nothing about original names or content types.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Create a new object. Never overwrites an existing key.
    async fn put(&self, key: &str, data: Bytes) -> Result<(), ObjectStoreError>;
    /// Size in bytes of an existing object.
    async fn size(&self, key: &str) -> Result<u64, ObjectStoreError>;
    /// Reader over `len` bytes starting at `offset`.
    async fn open_range(
        &self,
        key: &str,
        offset: u64,
        len: u64,
    ) -> Result<ObjectReader, ObjectStoreError>;
    /// Whole object contents, or `None` if it is `limit` bytes or larger.
    async fn read_small(&self, key: &str, limit: u64) -> Result<Option<Bytes>, ObjectStoreError>;
    async fn exists(&self, key: &str) -> Result<bool, ObjectStoreError>;
    /// All keys, sorted.
    async fn list(&self) -> Result<Vec<String>, ObjectStoreError>;
}
