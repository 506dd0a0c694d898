use std::{fmt::Debug, hash::Hash};

use derivative::Derivative;
use moka::sync::SegmentedCache;
use tracing::debug;

use crate::cache::Cache;

/// Bounded cache backed by moka. Eviction (capacity and TTL) is handled by
/// moka and is invisible to the fetcher: an evicted key is simply a miss.
pub struct LocalCache<K, V>
where
    K: Hash + Eq + Sync + Send + Clone,
    V: Clone + Sync + Send,
{
    data: SegmentedCache<K, V>,
}

#[derive(Derivative)]
#[derivative(Default)]
pub struct LocalCacheOption {
    #[derivative(Default(value = "8"))]
    pub segments: usize,
    #[derivative(Default(value = "std::time::Duration::from_secs( 5 * 60)"))]
    pub ttl: std::time::Duration,
    #[derivative(Default(value = "1024"))]
    pub max_capacity: u64,
}

impl<K, V> LocalCache<K, V>
where
    K: Hash + Eq + Sync + Send + Clone + 'static,
    V: Clone + Sync + Send + 'static,
{
    pub fn new(opts: LocalCacheOption) -> Self {
        let data = SegmentedCache::builder(opts.segments)
            .time_to_live(opts.ttl)
            .max_capacity(opts.max_capacity)
            .build();

        Self { data }
    }
}

impl<K, V> Cache for LocalCache<K, V>
where
    K: Hash + Eq + Sync + Send + Clone + 'static + Debug,
    V: Clone + Sync + Send + 'static,
{
    type Key = K;
    type Value = V;

    fn get(&self, key: &Self::Key) -> Option<Self::Value> {
        self.data.get(key)
    }

    fn set(&self, key: Self::Key, value: Self::Value) {
        debug!("autobatch: localcache: set key: {key:?}");

        self.data.insert(key, value);
    }

    fn del(&self, key: &Self::Key) {
        debug!("autobatch: localcache: del key: {key:?}");

        self.data.invalidate(key);
    }

    fn name(&self) -> &'static str {
        "localcache"
    }
}
