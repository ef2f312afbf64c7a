use super::keyed::KeyedStore;
use super::models::FileRecord;

/// In-memory registry of uploaded file metadata, keyed by file id.
///
/// The registry never touches backing storage. A record whose object has
/// disappeared from disk still resolves here; the serving layer treats it as
/// not found.
#[derive(Debug, Default)]
pub struct ContentRegistry {
    files: KeyedStore<FileRecord>,
}

impl ContentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&self, record: FileRecord) {
        self.files.put(record.id.clone(), record);
    }

    pub fn get(&self, id: &str) -> Option<FileRecord> {
        self.files.get(id)
    }

    /// All records, ordered by id.
    pub fn list(&self) -> Vec<FileRecord> {
        self.files.entries().into_iter().map(|(_, r)| r).collect()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
