use std::{collections::HashMap, fmt::Debug, hash::Hash, sync::Arc};

use tracing::debug;

use crate::cache::Cache;

/// Unbounded in-process cache. Entries are kept until they are deleted or the
/// process exits.
pub struct MemoryCache<K, V>
where
    K: Hash + Eq + Sync + Send + Clone,
    V: Clone + Sync + Send,
{
    data: Arc<parking_lot::RwLock<HashMap<K, V>>>,
}

impl<K, V> MemoryCache<K, V>
where
    K: Hash + Eq + Sync + Send + Clone,
    V: Clone + Sync + Send,
{
    pub fn new() -> Self {
        Self {
            data: Arc::new(parking_lot::RwLock::new(HashMap::new())),
        }
    }

    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }
}

impl<K, V> Default for MemoryCache<K, V>
where
    K: Hash + Eq + Sync + Send + Clone,
    V: Clone + Sync + Send,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Cache for MemoryCache<K, V>
where
    K: Hash + Eq + Sync + Send + Clone + Debug,
    V: Clone + Sync + Send,
{
    type Key = K;
    type Value = V;

    fn get(&self, key: &Self::Key) -> Option<Self::Value> {
        self.data.read().get(key).cloned()
    }

    fn set(&self, key: Self::Key, value: Self::Value) {
        debug!(msg = "autobatch: memorycache: set", key = ?key);

        self.data.write().insert(key, value);
    }

    fn del(&self, key: &Self::Key) {
        debug!(msg = "autobatch: memorycache: del", key = ?key);

        self.data.write().remove(key);
    }

    fn name(&self) -> &'static str {
        "memorycache"
    }
}
