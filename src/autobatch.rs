use std::{fmt::Debug, hash::Hash, sync::Arc, time::Duration};

use anyhow::Result;
use arc_swap::ArcSwapOption;
use futures::future::join_all;
use tokio::{sync::mpsc, time::Instant};
use tracing::{debug, error};

use crate::{
    batch::{Batch, Pending},
    builder::AutoBatchBuilder,
    cache::Cache,
    error::AutoBatchError,
    loader::{Completeness, Loader},
    Options,
};

pub type MetricsFn = fn(method: &str, is_error: bool, ns: &str, from: &str, cache_name: &str);

/// Coalesces single-key lookups into debounced bulk fetches, with a cache in
/// front.
///
/// Every instance owns its own queue, worker task and debounce timer, so
/// several fetchers (one per entity type, say) never interfere with each
/// other. [`shutdown`](Self::shutdown) stops the worker and flushes whatever
/// is still queued right away. Dropping the instance stops the worker too;
/// requests left in the queue then have no one waiting and are discarded.
pub struct AutoBatch<K, V, C>
where
    C: Cache<Key = K, Value = V>,
{
    pub(crate) cache_store: Arc<C>,
    pub(crate) loader: Arc<Loader<K, V>>,
    pub(crate) is_complete: Completeness<V>,

    pub(crate) namespace: Option<String>,
    pub(crate) debounce: Duration,
    pub(crate) max_batch_size: Option<usize>,
    pub(crate) channel_capacity: usize,
    pub(crate) source_first: bool,

    pub(crate) input_channel: ArcSwapOption<mpsc::Sender<Pending<K, V>>>,
    pub(crate) stop_ch: Option<mpsc::Sender<bool>>,

    pub(crate) on_metrics: Option<MetricsFn>,
}

impl<K, V, C> AutoBatch<K, V, C>
where
    K: Clone + Debug + Hash + Eq + Sync + Send + 'static,
    V: Clone + Sync + Send + 'static,
    C: Cache<Key = K, Value = V> + Sync + Send + 'static,
{
    pub fn builder() -> AutoBatchBuilder<K, V, C> {
        AutoBatchBuilder::new()
    }

    /// Spawns the worker that owns the pending queue. Must run inside a tokio
    /// runtime.
    pub(crate) fn start(&mut self) {
        let (tx, mut rx) = mpsc::channel(1);
        self.stop_ch.replace(tx);

        let (input_tx, mut input_rx) = mpsc::channel(self.channel_capacity);
        self.input_channel.store(Some(Arc::new(input_tx)));

        let loader = self.loader.clone();
        let cache = self.cache_store.clone();
        let debounce = self.debounce;
        let max_batch_size = self.max_batch_size;
        let ns = self.namespace.clone().unwrap_or_default();

        tokio::spawn(async move {
            let mut batch: Batch<K, V> = Batch::default();
            let timer = tokio::time::sleep(debounce);
            tokio::pin!(timer);
            let mut armed = false;

            let mut flush_leftovers = false;

            loop {
                tokio::select! {
                    biased;

                    flush = rx.recv() => {
                        input_rx.close();
                        while let Some(p) = input_rx.recv().await {
                            batch.push(p);
                        }
                        flush_leftovers = flush.unwrap_or(false);
                        break;
                    }
                    // a request already received re-arms the timer before it can fire
                    p = input_rx.recv() => {
                        let Some(p) = p else {
                            break;
                        };
                        batch.push(p);

                        if max_batch_size.is_some_and(|max| batch.key_count() >= max) {
                            debug!(msg = "autobatch: batch full, flush early", ns = %ns, keys = batch.key_count());
                            armed = false;
                            Self::dispatch(std::mem::take(&mut batch), loader.clone(), cache.clone(), &ns);
                            continue;
                        }

                        // debounce: the deadline follows the latest request
                        timer.as_mut().reset(deadline_after(debounce));
                        armed = true;
                    }
                    _ = &mut timer, if armed => {
                        armed = false;
                        Self::dispatch(std::mem::take(&mut batch), loader.clone(), cache.clone(), &ns);
                    }
                }
            }

            if batch.is_empty() {
                return;
            }
            if flush_leftovers {
                debug!(msg = "autobatch: worker stopping, flush leftovers", ns = %ns, requests = batch.len());
                Self::dispatch(batch, loader, cache, &ns);
            } else {
                debug!(msg = "autobatch: worker dropped, discard leftovers", ns = %ns, requests = batch.len());
            }
        });
    }

    fn dispatch(batch: Batch<K, V>, loader: Arc<Loader<K, V>>, cache: Arc<C>, ns: &str) {
        if batch.is_empty() {
            return;
        }

        tokio::spawn(Self::flush(batch, loader, cache, ns.to_string()));
    }

    async fn flush(mut batch: Batch<K, V>, loader: Arc<Loader<K, V>>, cache: Arc<C>, ns: String) {
        let keys = batch.keys().to_vec();
        debug!(msg = "autobatch: flush", ns = %ns, keys = ?keys, requests = batch.len());

        match (loader)(keys).await {
            Ok(kvs) => {
                debug!(msg = "autobatch: source returned", ns = %ns, records = kvs.len());

                for (key, value) in kvs {
                    cache.set(key.clone(), value.clone());

                    if batch.resolve(&key, &value) == 0 {
                        debug!(msg = "autobatch: source returned unrequested key", ns = %ns, key = ?key);
                    }
                }

                let absent = batch.resolve_rest_absent();
                if absent > 0 {
                    debug!(msg = "autobatch: requests left without record", ns = %ns, requests = absent);
                }
            }
            Err(e) => {
                error!(msg = "autobatch: bulk fetch failed", ns = %ns, error = ?e, requests = batch.len());
                batch.reject(AutoBatchError::Fetch(Arc::new(e)));
            }
        }
    }

    /// Looks up a single key.
    ///
    /// A cached record that passes the completeness predicate is returned
    /// without suspending. Otherwise the key joins the pending batch, which is
    /// flushed once no new request arrived for the debounce period (or when
    /// `max_batch_size` distinct keys are queued). Note that without
    /// `max_batch_size`, requests that keep arriving faster than the debounce
    /// period postpone the flush indefinitely.
    ///
    /// Returns `Ok(None)` when the source has no record for `key`.
    pub async fn lookup(&self, key: K) -> Result<Option<V>, AutoBatchError> {
        self.lookup_with_option(key, Options::default()).await
    }

    pub async fn lookup_with_option(
        &self,
        key: K,
        options: Options,
    ) -> Result<Option<V>, AutoBatchError> {
        let source_first = options.source_first.unwrap_or(self.source_first);

        if !source_first {
            if let Some(value) = self.cache_store.get(&key) {
                if (self.is_complete)(&value) {
                    debug!(msg = "autobatch: lookup from cache", key = ?key);
                    self.report("lookup", false, "cache");
                    return Ok(Some(value));
                }
                debug!(msg = "autobatch: cached record incomplete", key = ?key);
            }
        }

        let ret = self.enqueue(key).await;
        self.report(
            "lookup",
            ret.is_err(),
            match &ret {
                Ok(None) => "none",
                _ => "source",
            },
        );

        ret
    }

    /// Like [`lookup`](Self::lookup) but treats a missing record as
    /// [`AutoBatchError::NoSuchKey`].
    pub async fn lookup_required(&self, key: K) -> Result<V, AutoBatchError> {
        self.lookup(key).await?.ok_or(AutoBatchError::NoSuchKey)
    }

    /// Looks up all `keys` concurrently, so the misses share one batch.
    /// Returns the pairs that were found; fails if any lookup failed.
    pub async fn lookup_many(&self, keys: &[K]) -> Result<Vec<(K, V)>, AutoBatchError> {
        if keys.is_empty() {
            return Ok(vec![]);
        }

        let rets = join_all(
            keys.iter()
                .map(|key| async move { (key.clone(), self.lookup(key.clone()).await) }),
        )
        .await;

        let mut kvs = Vec::with_capacity(rets.len());
        for (key, ret) in rets {
            if let Some(value) = ret? {
                kvs.push((key, value));
            }
        }

        Ok(kvs)
    }

    async fn enqueue(&self, key: K) -> Result<Option<V>, AutoBatchError> {
        let Some(input) = self.input_channel.load_full() else {
            return Err(AutoBatchError::Stopped);
        };

        let (pending, rx) = Pending::new(key);
        input
            .send(pending)
            .await
            .map_err(|_| AutoBatchError::Stopped)?;

        rx.await.map_err(|_| AutoBatchError::Canceled)?
    }

    /// Stops accepting lookups and flushes the queued ones without waiting for
    /// the debounce period. Lookups issued afterwards fail with
    /// [`AutoBatchError::Stopped`].
    pub fn shutdown(&self) {
        if let Err(e) = self.stop(true) {
            debug!(msg = "autobatch: shutdown signal not sent", error = ?e);
        }
    }

    pub fn invalidate(&self, keys: &[K]) {
        for key in keys {
            self.cache_store.del(key);
        }
    }

    pub fn with_cache<T>(&self, op: impl FnOnce(&C) -> T) -> T {
        op(&self.cache_store)
    }

    fn report(&self, method: &str, is_error: bool, from: &str) {
        if let Some(metrics) = self.on_metrics {
            metrics(
                method,
                is_error,
                self.namespace.as_deref().unwrap_or(""),
                from,
                self.cache_store.name(),
            );
        }
    }
}

impl<K, V, C> Drop for AutoBatch<K, V, C>
where
    C: Cache<Key = K, Value = V>,
{
    fn drop(&mut self) {
        let _ = self.stop(false);
    }
}

impl<K, V, C> AutoBatch<K, V, C>
where
    C: Cache<Key = K, Value = V>,
{
    fn stop(&self, flush_leftovers: bool) -> Result<()> {
        self.input_channel.store(None);

        if let Some(s) = self.stop_ch.as_ref() {
            s.try_send(flush_leftovers)?;
        }

        Ok(())
    }
}

// Instant + Duration panics on overflow, a huge debounce means "never".
fn deadline_after(d: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(d)
        .unwrap_or_else(|| now + Duration::from_secs(86400 * 365 * 30))
}
