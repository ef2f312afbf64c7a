use async_trait::async_trait;
use bytes::Bytes;
use std::io::{ErrorKind, SeekFrom};
use std::path::{Path, PathBuf};
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};

use super::{ObjectReader, ObjectStore, ObjectStoreError};
use crate::ids::sanitize_name;

/// Object store backed by a single flat directory.
pub struct LocalStore {
    base_path: PathBuf,
}

impl LocalStore {
    pub fn new<P: AsRef<Path>>(base_path: P) -> Result<Self, std::io::Error> {
        let base_path = base_path.as_ref().to_path_buf();
        std::fs::create_dir_all(&base_path)?;
        Ok(Self { base_path })
    }

    /// Keys must be bare file names; anything that could leave the directory
    /// is rejected.
    fn object_path(&self, key: &str) -> Result<PathBuf, ObjectStoreError> {
        match sanitize_name(key) {
            Some(name) if name == key => Ok(self.base_path.join(key)),
            _ => Err(ObjectStoreError::InvalidKey(key.to_string())),
        }
    }

    async fn regular_file_len(&self, key: &str, path: &Path) -> Result<u64, ObjectStoreError> {
        match tokio::fs::metadata(path).await {
            Ok(meta) if meta.is_file() => Ok(meta.len()),
            Ok(_) => Err(ObjectStoreError::NotFound(key.to_string())),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(ObjectStoreError::NotFound(key.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl ObjectStore for LocalStore {
    async fn put(&self, key: &str, data: Bytes) -> Result<(), ObjectStoreError> {
        let path = self.object_path(key)?;
        let mut file = match tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(ObjectStoreError::AlreadyExists(key.to_string()))
            }
            Err(e) => return Err(e.into()),
        };

        let written = async {
            file.write_all(&data).await?;
            file.flush().await
        }
        .await;
        if let Err(e) = written {
            drop(file);
            let _ = tokio::fs::remove_file(&path).await;
            return Err(e.into());
        }
        Ok(())
    }

    async fn size(&self, key: &str) -> Result<u64, ObjectStoreError> {
        let path = self.object_path(key)?;
        self.regular_file_len(key, &path).await
    }

    async fn open_range(
        &self,
        key: &str,
        offset: u64,
        len: u64,
    ) -> Result<ObjectReader, ObjectStoreError> {
        let path = self.object_path(key)?;
        let mut file = match tokio::fs::File::open(&path).await {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(ObjectStoreError::NotFound(key.to_string()))
            }
            Err(e) => return Err(e.into()),
        };
        if offset > 0 {
            file.seek(SeekFrom::Start(offset)).await?;
        }
        Ok(Box::pin(file.take(len)))
    }

    async fn read_small(&self, key: &str, limit: u64) -> Result<Option<Bytes>, ObjectStoreError> {
        let path = self.object_path(key)?;
        if self.regular_file_len(key, &path).await? >= limit {
            return Ok(None);
        }
        let data = tokio::fs::read(&path).await?;
        Ok(Some(Bytes::from(data)))
    }

    async fn exists(&self, key: &str) -> Result<bool, ObjectStoreError> {
        let path = self.object_path(key)?;
        match self.regular_file_len(key, &path).await {
            Ok(_) => Ok(true),
            Err(ObjectStoreError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn list(&self) -> Result<Vec<String>, ObjectStoreError> {
        let mut entries = tokio::fs::read_dir(&self.base_path).await?;
        let mut keys = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            match entry.file_name().into_string() {
                Ok(name) => keys.push(name),
                Err(name) => tracing::debug!(?name, "Skipping non UTF-8 object name"),
            }
        }
        keys.sort();
        Ok(keys)
    }
}
