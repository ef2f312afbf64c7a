use std::collections::{BTreeMap, HashMap};

use thiserror::Error;

use super::keyed::KeyedStore;
use super::models::Snippet;
use crate::ids;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Snippet id space exhausted ({0} live snippets)")]
    Full(usize),
}

/// In-memory snippet store, keyed by snippet id.
///
/// Membership is the only record of whether a snippet exists; deletes leave
/// nothing behind.
#[derive(Debug, Default)]
pub struct SnippetStore {
    snippets: KeyedStore<Snippet>,
}

impl SnippetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from a loaded snapshot, filling in each snippet's id from
    /// its key.
    pub fn from_snapshot(map: BTreeMap<String, Snippet>) -> Self {
        let map: HashMap<String, Snippet> = map
            .into_iter()
            .map(|(id, mut snippet)| {
                snippet.id = id.clone();
                (id, snippet)
            })
            .collect();
        Self {
            snippets: KeyedStore::from_map(map),
        }
    }

    pub fn put(&self, id: &str, mut snippet: Snippet) {
        snippet.id = id.to_string();
        self.snippets.put(id, snippet);
    }

    pub fn get(&self, id: &str) -> Option<Snippet> {
        self.snippets.get(id)
    }

    /// Remove a snippet. Returns whether it existed.
    pub fn delete(&self, id: &str) -> bool {
        self.snippets.delete(id).is_some()
    }

    /// Insert `snippet` under a freshly generated id.
    ///
    /// The collision check and the insert happen under one write lock, so two
    /// concurrent inserts can never be handed the same id.
    pub fn insert_new(&self, mut snippet: Snippet) -> Result<Snippet, StoreError> {
        self.snippets.with_write(|map| {
            if map.len() >= ids::SNIPPET_ID_SPACE {
                return Err(StoreError::Full(map.len()));
            }
            let id = ids::generate_snippet_id(&mut rand::thread_rng(), |c| map.contains_key(c));
            snippet.id = id.clone();
            map.insert(id, snippet.clone());
            Ok(snippet)
        })
    }

    /// Read a snippet, removing it in the same critical section if it is
    /// burn-after-reading.
    ///
    /// Of any number of concurrent callers, exactly one observes a
    /// burn-after-reading snippet. Regular snippets are read under the shared
    /// lock only.
    pub fn consume_if_burn(&self, id: &str) -> Option<Snippet> {
        let snippet = self.snippets.with_read(|map| map.get(id).cloned())?;
        if !snippet.burn_after_reading {
            return Some(snippet);
        }

        // Re-check: another caller may have burned or replaced it meanwhile.
        self.snippets.with_write(|map| {
            let burn = map.get(id)?.burn_after_reading;
            if burn {
                map.remove(id)
            } else {
                map.get(id).cloned()
            }
        })
    }

    /// All snippets, ordered by id.
    pub fn list(&self) -> Vec<Snippet> {
        self.snippets.entries().into_iter().map(|(_, s)| s).collect()
    }

    /// Point-in-time copy for persistence.
    pub fn snapshot(&self) -> BTreeMap<String, Snippet> {
        self.snippets.entries().into_iter().collect()
    }

    pub fn len(&self) -> usize {
        self.snippets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snippets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_put_get_delete() {
        let store = SnippetStore::new();
        store.put("abc", Snippet::new("title", "body", false));

        let snippet = store.get("abc").expect("snippet should exist");
        assert_eq!(snippet.id, "abc");
        assert_eq!(snippet.text, "body");

        assert!(store.delete("abc"));
        assert!(!store.delete("abc"));
        assert!(store.get("abc").is_none());
    }

    #[test]
    fn test_insert_new_assigns_distinct_ids() {
        let store = SnippetStore::new();
        let mut seen = HashSet::new();
        for i in 0..1000 {
            let snippet = store
                .insert_new(Snippet::new("", format!("text {i}"), false))
                .unwrap();
            assert_eq!(snippet.id.len(), ids::SNIPPET_ID_LEN);
            assert!(seen.insert(snippet.id));
        }
        assert_eq!(store.len(), 1000);
    }

    #[test]
    fn test_insert_new_reports_full_store() {
        let store = SnippetStore::new();
        store.snippets.with_write(|map| {
            for i in 0..ids::SNIPPET_ID_SPACE {
                map.insert(format!("k{i}"), Snippet::new("", "", false));
            }
        });

        assert_eq!(
            store.insert_new(Snippet::new("", "late", false)),
            Err(StoreError::Full(ids::SNIPPET_ID_SPACE))
        );
    }

    #[test]
    fn test_consume_keeps_regular_snippets() {
        let store = SnippetStore::new();
        store.put("keep", Snippet::new("t", "stays", false));

        assert!(store.consume_if_burn("keep").is_some());
        assert!(store.consume_if_burn("keep").is_some());
        assert!(store.get("keep").is_some());
    }

    #[test]
    fn test_consume_regular_snippet_only_needs_shared_lock() {
        let store = SnippetStore::new();
        store.put("keep", Snippet::new("t", "stays", false));

        // Another reader holds the lock for the whole read.
        let read = store.snippets.with_read(|_| {
            std::thread::scope(|s| {
                s.spawn(|| store.consume_if_burn("keep"))
                    .join()
                    .unwrap()
            })
        });

        assert_eq!(read.unwrap().text, "stays");
        assert!(store.get("keep").is_some());
    }

    #[test]
    fn test_consume_missing_snippet() {
        let store = SnippetStore::new();
        assert!(store.consume_if_burn("nop").is_none());
    }

    #[test]
    fn test_consume_burns_exactly_once() {
        let store = SnippetStore::new();
        store.put("brn", Snippet::new("t", "secret", true));

        let first = store.consume_if_burn("brn").expect("first read succeeds");
        assert_eq!(first.text, "secret");
        assert!(store.consume_if_burn("brn").is_none());
        assert!(store.get("brn").is_none());
    }

    #[test]
    fn test_consume_burn_under_contention() {
        let store = Arc::new(SnippetStore::new());
        store.put("brn", Snippet::new("t", "secret", true));
        let hits = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let store = Arc::clone(&store);
                let hits = Arc::clone(&hits);
                std::thread::spawn(move || {
                    if store.consume_if_burn("brn").is_some() {
                        hits.fetch_add(1, Ordering::SeqCst);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_from_snapshot_restores_ids() {
        let mut map = BTreeMap::new();
        map.insert("x1y".to_string(), Snippet::new("a", "b", true));
        let store = SnippetStore::from_snapshot(map);

        let snippet = store.get("x1y").unwrap();
        assert_eq!(snippet.id, "x1y");
        assert!(snippet.burn_after_reading);
    }
}
