//! Shared test helpers for sharebox unit tests.

use std::sync::Arc;

use crate::config::{Config, ServerConfig, StorageConfig};
use crate::object_store::LocalStore;
use crate::qr::PngQrEncoder;
use crate::storage::{ContentRegistry, SnapshotFile, SnippetStore};
use crate::AppState;

/// Create a test Config rooted in a temporary directory.
pub fn test_config(temp_dir: &tempfile::TempDir) -> Config {
    Config {
        server: ServerConfig {
            bind_address: "127.0.0.1:0".to_string(),
            public_base_url: None,
        },
        storage: StorageConfig {
            upload_dir: temp_dir.path().join("uploads").to_string_lossy().to_string(),
            snapshot_path: temp_dir
                .path()
                .join("snippets.json")
                .to_string_lossy()
                .to_string(),
        },
        max_upload_size: 10 * 1024 * 1024, // 10MB for tests
        qr_size: 64,
    }
}

/// Create a test AppState with empty stores and a local object store.
pub fn test_state(temp_dir: &tempfile::TempDir) -> Arc<AppState> {
    let config = test_config(temp_dir);
    let object_store =
        LocalStore::new(&config.storage.upload_dir).expect("Failed to create test object store");

    Arc::new(AppState {
        snapshot: SnapshotFile::new(&config.storage.snapshot_path),
        config,
        files: ContentRegistry::new(),
        snippets: SnippetStore::new(),
        object_store: Arc::new(object_store),
        qr: Arc::new(PngQrEncoder::new(64)),
    })
}
