//! sharebox - A local-network drop box for text snippets and files
//!
//! This crate provides:
//! - A snippet store with burn-after-reading support, persisted to a JSON snapshot
//! - An upload store for files in a flat directory, with a metadata registry
//! - Range-aware streaming so media players can seek
//! - QR-encoded share links for every snippet and file

pub mod api;
pub mod classify;
pub mod config;
pub mod delivery;
pub mod ids;
pub mod object_store;
pub mod qr;
pub mod storage;
#[cfg(test)]
pub mod testutil;

use std::sync::Arc;

use thiserror::Error;

use config::Config;
use object_store::{LocalStore, ObjectStore};
use qr::QrEncoder;
use storage::{ContentRegistry, SnapshotError, SnapshotFile, SnippetStore};

#[derive(Debug, Error)]
pub enum InitError {
    #[error("Cannot prepare upload directory {path}: {source}")]
    UploadDir {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

/// Shared application state
pub struct AppState {
    pub config: Config,
    pub files: ContentRegistry,
    pub snippets: SnippetStore,
    pub snapshot: SnapshotFile,
    pub object_store: Arc<dyn ObjectStore>,
    pub qr: Arc<dyn QrEncoder>,
}

impl AppState {
    /// Prepare backing storage and hydrate the snippet store.
    ///
    /// An unreadable or unparsable snapshot is an error: the server must not
    /// start with ambiguous state.
    pub async fn init(config: Config, qr: Arc<dyn QrEncoder>) -> Result<Self, InitError> {
        let store =
            LocalStore::new(&config.storage.upload_dir).map_err(|source| InitError::UploadDir {
                path: config.storage.upload_dir.clone(),
                source,
            })?;

        let snapshot = SnapshotFile::new(&config.storage.snapshot_path);
        let snippets = SnippetStore::from_snapshot(snapshot.load().await?);

        Ok(Self {
            config,
            files: ContentRegistry::new(),
            snippets,
            snapshot,
            object_store: Arc::new(store),
            qr,
        })
    }

    /// Write the snippet store to its snapshot. Failures are logged and the
    /// previous snapshot stays in place.
    ///
    /// The store is captured under the snapshot's save lock, so the file on
    /// disk always reflects the latest completed capture.
    pub async fn persist_snippets(&self) -> bool {
        match self.snapshot.save_with(|| self.snippets.snapshot()).await {
            Ok(()) => true,
            Err(e) => {
                tracing::error!(error = %e, "Failed to persist snippets");
                false
            }
        }
    }

    /// Final flush before the process exits.
    pub async fn shutdown(&self) {
        if self.persist_snippets().await {
            tracing::info!(
                snippets = self.snippets.len(),
                path = %self.snapshot.path().display(),
                "Saved snippets on shutdown"
            );
        }
    }
}
