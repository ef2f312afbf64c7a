use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// A string-keyed map behind one reader/writer lock.
///
/// Values are cloned out, so readers never hold the lock past the call.
#[derive(Debug)]
pub struct KeyedStore<V> {
    inner: RwLock<HashMap<String, V>>,
}

impl<V> Default for KeyedStore<V> {
    fn default() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }
}

impl<V: Clone> KeyedStore<V> {
    pub fn from_map(map: HashMap<String, V>) -> Self {
        Self {
            inner: RwLock::new(map),
        }
    }

    pub fn put(&self, key: impl Into<String>, value: V) {
        self.write().insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<V> {
        self.read().get(key).cloned()
    }

    pub fn delete(&self, key: &str) -> Option<V> {
        self.write().remove(key)
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// All entries, sorted by key.
    pub fn entries(&self) -> Vec<(String, V)> {
        let mut entries: Vec<(String, V)> = self
            .read()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    /// Run `f` with shared access to the map.
    pub fn with_read<T>(&self, f: impl FnOnce(&HashMap<String, V>) -> T) -> T {
        f(&self.read())
    }

    /// Run `f` with exclusive access to the map.
    pub fn with_write<T>(&self, f: impl FnOnce(&mut HashMap<String, V>) -> T) -> T {
        f(&mut self.write())
    }

    // A panic while holding the guard cannot leave a half-written entry
    // (every mutation is a single map call), so poisoning is ignored.
    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, V>> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, V>> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}
