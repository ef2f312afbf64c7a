use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::Mutex;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Snapshot {path} is not valid JSON: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SnapshotError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        SnapshotError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// A JSON snapshot file holding one keyed map.
///
/// Saves go through a sibling temp file and a rename, so the file at `path`
/// is always either the previous complete snapshot or the new one. Saves are
/// serialized so concurrent callers never share the temp file.
#[derive(Debug)]
pub struct SnapshotFile {
    path: PathBuf,
    save_lock: Mutex<()>,
}

impl SnapshotFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            save_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Load the snapshot. A missing file is a first run and yields an empty map.
    pub async fn load<T: DeserializeOwned>(&self) -> Result<BTreeMap<String, T>, SnapshotError> {
        let data = match tokio::fs::read(&self.path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "No snapshot found, starting empty");
                return Ok(BTreeMap::new());
            }
            Err(e) => return Err(SnapshotError::io(&self.path, e)),
        };

        let map: BTreeMap<String, T> =
            serde_json::from_slice(&data).map_err(|source| SnapshotError::Parse {
                path: self.path.clone(),
                source,
            })?;

        tracing::info!(path = %self.path.display(), entries = map.len(), "Loaded snapshot");
        Ok(map)
    }

    /// Atomically replace the snapshot with `entries`.
    pub async fn save<T: Serialize>(
        &self,
        entries: &BTreeMap<String, T>,
    ) -> Result<(), SnapshotError> {
        let _guard = self.save_lock.lock().await;
        self.write(entries).await
    }

    /// Atomically replace the snapshot with whatever `capture` returns.
    ///
    /// `capture` runs while the save lock is held, so saves land on disk in
    /// the order their contents were captured and a stale capture can never
    /// overwrite a newer one.
    pub async fn save_with<T, F>(&self, capture: F) -> Result<(), SnapshotError>
    where
        T: Serialize,
        F: FnOnce() -> BTreeMap<String, T>,
    {
        let _guard = self.save_lock.lock().await;
        let entries = capture();
        self.write(&entries).await
    }

    // Caller must hold `save_lock`.
    async fn write<T: Serialize>(&self, entries: &BTreeMap<String, T>) -> Result<(), SnapshotError> {
        let data = serde_json::to_vec_pretty(entries)?;
        let temp_path = self.temp_path();

        tokio::fs::write(&temp_path, &data)
            .await
            .map_err(|e| SnapshotError::io(&temp_path, e))?;
        if let Err(e) = tokio::fs::rename(&temp_path, &self.path).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(SnapshotError::io(&self.path, e));
        }

        tracing::debug!(path = %self.path.display(), entries = entries.len(), "Saved snapshot");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::models::Snippet;

    #[tokio::test]
    async fn test_load_missing_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = SnapshotFile::new(dir.path().join("snippets.json"));

        let map: BTreeMap<String, Snippet> = snapshot.load().await.unwrap();
        assert!(map.is_empty());
    }

    #[tokio::test]
    async fn test_save_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = SnapshotFile::new(dir.path().join("snippets.json"));

        let mut map = BTreeMap::new();
        map.insert("abc".to_string(), Snippet::new("t", "x", false));
        snapshot.save(&map).await.unwrap();

        assert!(dir.path().join("snippets.json").exists());
        assert!(!dir.path().join("snippets.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_saved_document_shape() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = SnapshotFile::new(dir.path().join("snippets.json"));

        let mut map = BTreeMap::new();
        map.insert("abc".to_string(), Snippet::new("Title", "hello", true));
        snapshot.save(&map).await.unwrap();

        let raw = std::fs::read_to_string(snapshot.path()).unwrap();
        assert!(raw.contains('\n'), "snapshot should be indented");
        let doc: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(
            doc,
            serde_json::json!({
                "abc": {"title": "Title", "text": "hello", "burn_after_reading": true}
            })
        );
    }

    #[tokio::test]
    async fn test_load_corrupt_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snippets.json");
        std::fs::write(&path, b"{ not json").unwrap();

        let result: Result<BTreeMap<String, Snippet>, _> = SnapshotFile::new(&path).load().await;
        assert!(matches!(result, Err(SnapshotError::Parse { .. })));
    }

    #[tokio::test]
    async fn test_failed_save_keeps_previous_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snippets.json");
        let snapshot = SnapshotFile::new(&path);

        let mut map = BTreeMap::new();
        map.insert("old".to_string(), Snippet::new("t", "kept", false));
        snapshot.save(&map).await.unwrap();

        // A directory squatting on the temp path makes the write fail.
        std::fs::create_dir(dir.path().join("snippets.json.tmp")).unwrap();
        map.insert("new".to_string(), Snippet::new("t", "lost", false));
        assert!(snapshot.save(&map).await.is_err());

        let loaded: BTreeMap<String, Snippet> = snapshot.load().await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert!(loaded.contains_key("old"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_save_with_captures_under_lock() {
        use std::sync::atomic::{AtomicBool, Ordering};
        use std::sync::Arc;

        let dir = tempfile::tempdir().unwrap();
        let snapshot = Arc::new(SnapshotFile::new(dir.path().join("snippets.json")));
        let captured = Arc::new(AtomicBool::new(false));

        let guard = snapshot.save_lock.lock().await;
        let task = {
            let snapshot = Arc::clone(&snapshot);
            let captured = Arc::clone(&captured);
            tokio::spawn(async move {
                snapshot
                    .save_with(|| {
                        captured.store(true, Ordering::SeqCst);
                        let mut map = BTreeMap::new();
                        map.insert("abc".to_string(), Snippet::new("t", "x", false));
                        map
                    })
                    .await
            })
        };

        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert!(!captured.load(Ordering::SeqCst), "captured before the lock was free");

        drop(guard);
        task.await.unwrap().unwrap();
        assert!(captured.load(Ordering::SeqCst));

        let loaded: BTreeMap<String, Snippet> = snapshot.load().await.unwrap();
        assert!(loaded.contains_key("abc"));
    }
}
