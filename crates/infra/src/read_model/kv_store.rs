use std::collections::HashMap;
use std::hash::Hash;
use std::sync::RwLock;

use std::sync::Arc;

/// Key/value store abstraction for read models and reference data.
pub trait KeyValueStore<K, V>: Send + Sync {
    fn get(&self, key: &K) -> Option<V>;
    fn upsert(&self, key: K, value: V);
    /// Remove and return the value under `key`.
    fn remove(&self, key: &K) -> Option<V>;
    fn list(&self) -> Vec<V>;
    /// Drop every record (rebuild support).
    fn clear(&self);
}

impl<K, V, S> KeyValueStore<K, V> for Arc<S>
where
    S: KeyValueStore<K, V> + ?Sized,
{
    fn get(&self, key: &K) -> Option<V> {
        (**self).get(key)
    }

    fn upsert(&self, key: K, value: V) {
        (**self).upsert(key, value)
    }

    fn remove(&self, key: &K) -> Option<V> {
        (**self).remove(key)
    }

    fn list(&self) -> Vec<V> {
        (**self).list()
    }

    fn clear(&self) {
        (**self).clear()
    }
}

/// In-memory store for tests/dev and single-process deployments.
#[derive(Debug)]
pub struct InMemoryKeyValueStore<K, V> {
    inner: RwLock<HashMap<K, V>>,
}

impl<K, V> InMemoryKeyValueStore<K, V> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }
}

impl<K, V> Default for InMemoryKeyValueStore<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> KeyValueStore<K, V> for InMemoryKeyValueStore<K, V>
where
    K: Eq + Hash + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn get(&self, key: &K) -> Option<V> {
        let map = self.inner.read().ok()?;
        map.get(key).cloned()
    }

    fn upsert(&self, key: K, value: V) {
        if let Ok(mut map) = self.inner.write() {
            map.insert(key, value);
        }
    }

    fn remove(&self, key: &K) -> Option<V> {
        let mut map = self.inner.write().ok()?;
        map.remove(key)
    }

    fn list(&self) -> Vec<V> {
        match self.inner.read() {
            Ok(map) => map.values().cloned().collect(),
            Err(_) => vec![],
        }
    }

    fn clear(&self) {
        if let Ok(mut map) = self.inner.write() {
            map.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upsert_get_remove() {
        let store: InMemoryKeyValueStore<u32, String> = InMemoryKeyValueStore::new();
        store.upsert(1, "one".into());
        store.upsert(1, "uno".into());
        store.upsert(2, "two".into());

        assert_eq!(store.get(&1).as_deref(), Some("uno"));
        assert_eq!(store.list().len(), 2);
        assert_eq!(store.remove(&2).as_deref(), Some("two"));
        assert!(store.get(&2).is_none());

        store.clear();
        assert!(store.list().is_empty());
    }
}
