use anyhow::Result;
use futures::future::BoxFuture;

/// Bulk fetch for a set of distinct keys. Keys missing from the returned pairs
/// are reported to their callers as absent.
pub type Loader<K, V> = Box<dyn Fn(Vec<K>) -> BoxFuture<'static, Result<Vec<(K, V)>>> + Send + Sync>;

/// Decides whether a cached record is good enough to skip the fetch.
pub type Completeness<V> = Box<dyn Fn(&V) -> bool + Send + Sync>;
