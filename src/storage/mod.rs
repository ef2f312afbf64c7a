mod keyed;
pub mod models;
mod registry;
pub mod snapshot;
mod snippets;

pub use keyed::KeyedStore;
pub use registry::ContentRegistry;
pub use snapshot::{SnapshotError, SnapshotFile};
pub use snippets::{SnippetStore, StoreError};
