use std::{fmt::Debug, hash::Hash, sync::Arc};

use anyhow::Result;
use arc_swap::ArcSwapOption;
use futures::future::BoxFuture;

use crate::{
    autobatch::{AutoBatch, MetricsFn},
    cache::Cache,
    error::AutoBatchError,
    loader::{Completeness, Loader},
};

pub struct AutoBatchBuilder<K, V, C>
where
    C: Cache<Key = K, Value = V>,
{
    pub(crate) cache: Option<C>,
    pub(crate) loader: Option<Loader<K, V>>,
    pub(crate) is_complete: Option<Completeness<V>>,

    pub(crate) namespace: Option<String>,
    pub(crate) debounce: std::time::Duration,
    pub(crate) max_batch_size: Option<usize>,
    pub(crate) channel_capacity: usize,
    pub(crate) source_first: bool,

    pub(crate) on_metrics: Option<MetricsFn>,
}

impl<K, V, C> AutoBatchBuilder<K, V, C>
where
    K: Clone + Debug + Hash + Eq + Sync + Send + 'static,
    V: Clone + Sync + Send + 'static,
    C: Cache<Key = K, Value = V> + Sync + Send + 'static,
{
    pub fn new() -> Self {
        Self {
            cache: None,
            loader: None,
            is_complete: None,

            namespace: None,
            debounce: std::time::Duration::from_millis(200),
            max_batch_size: None,
            channel_capacity: 512,
            source_first: false,

            on_metrics: None,
        }
    }

    pub fn cache(mut self, c: C) -> Self {
        self.cache = Some(c);
        self
    }

    pub fn loader(
        mut self,
        l: impl Fn(Vec<K>) -> BoxFuture<'static, Result<Vec<(K, V)>>> + Send + Sync + 'static,
    ) -> Self {
        self.loader = Some(Box::new(l));
        self
    }

    /// Cached records failing `f` are fetched again instead of being returned.
    pub fn complete_when(mut self, f: impl Fn(&V) -> bool + Send + Sync + 'static) -> Self {
        self.is_complete = Some(Box::new(f));
        self
    }

    pub fn namespace(mut self, ns: String) -> Self {
        self.namespace = Some(ns);
        self
    }

    /// Quiet period after the latest request before a batch is flushed.
    pub fn debounce(mut self, d: std::time::Duration) -> Self {
        self.debounce = d;
        self
    }

    /// Flush as soon as a batch holds `sz` distinct keys.
    pub fn max_batch_size(mut self, sz: usize) -> Self {
        self.max_batch_size = Some(sz.max(1));
        self
    }

    pub fn channel_capacity(mut self, sz: usize) -> Self {
        self.channel_capacity = sz.max(1);
        self
    }

    pub fn source_first(mut self, t: bool) -> Self {
        self.source_first = t;
        self
    }

    pub fn on_metrics(mut self, f: MetricsFn) -> Self {
        self.on_metrics = Some(f);
        self
    }

    pub fn build(self) -> Result<AutoBatch<K, V, C>, AutoBatchError> {
        let cache = self.cache.ok_or(AutoBatchError::MissingCache)?;
        let loader = self.loader.ok_or(AutoBatchError::MissingLoader)?;

        let mut ab = AutoBatch::<K, V, C> {
            cache_store: Arc::new(cache),
            loader: Arc::new(loader),
            is_complete: self.is_complete.unwrap_or_else(|| Box::new(|_: &V| true)),

            namespace: self.namespace,
            debounce: self.debounce,
            max_batch_size: self.max_batch_size,
            channel_capacity: self.channel_capacity,
            source_first: self.source_first,

            input_channel: ArcSwapOption::empty(),
            stop_ch: None,

            on_metrics: self.on_metrics,
        };
        ab.start();

        Ok(ab)
    }
}
