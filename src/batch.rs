use std::{collections::HashSet, hash::Hash};

use tokio::sync::oneshot;

use crate::error::AutoBatchError;

pub(crate) type Outcome<V> = Result<Option<V>, AutoBatchError>;

/// A queued lookup. The slot is consumed when the outcome is sent, so a
/// request can be settled at most once.
pub(crate) struct Pending<K, V> {
    pub(crate) key: K,
    slot: oneshot::Sender<Outcome<V>>,
}

impl<K, V> Pending<K, V> {
    pub(crate) fn new(key: K) -> (Self, oneshot::Receiver<Outcome<V>>) {
        let (slot, rx) = oneshot::channel();
        (Self { key, slot }, rx)
    }

    pub(crate) fn settle(self, outcome: Outcome<V>) {
        // the caller may have given up on the lookup, nothing to do then
        let _ = self.slot.send(outcome);
    }
}

/// Requests accumulated between two flushes, with their distinct keys in
/// first-seen order.
pub(crate) struct Batch<K, V> {
    pending: Vec<Pending<K, V>>,
    keys: Vec<K>,
    seen: HashSet<K>,
}

impl<K, V> Default for Batch<K, V> {
    fn default() -> Self {
        Self {
            pending: Vec::new(),
            keys: Vec::new(),
            seen: HashSet::new(),
        }
    }
}

impl<K, V> Batch<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    pub(crate) fn push(&mut self, p: Pending<K, V>) {
        if self.seen.insert(p.key.clone()) {
            self.keys.push(p.key.clone());
        }
        self.pending.push(p);
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub(crate) fn len(&self) -> usize {
        self.pending.len()
    }

    pub(crate) fn key_count(&self) -> usize {
        self.keys.len()
    }

    pub(crate) fn keys(&self) -> &[K] {
        &self.keys
    }

    /// Settles every request for `key` with `value` and drops them from the
    /// batch. Returns how many requests were settled.
    pub(crate) fn resolve(&mut self, key: &K, value: &V) -> usize {
        let (matched, rest): (Vec<_>, Vec<_>) = std::mem::take(&mut self.pending)
            .into_iter()
            .partition(|p| &p.key == key);
        self.pending = rest;

        let n = matched.len();
        for p in matched {
            p.settle(Ok(Some(value.clone())));
        }

        n
    }

    /// Settles whatever is left as absent.
    pub(crate) fn resolve_rest_absent(self) -> usize {
        let n = self.pending.len();
        for p in self.pending {
            p.settle(Ok(None));
        }

        n
    }

    pub(crate) fn reject(self, err: AutoBatchError) {
        for p in self.pending {
            p.settle(Err(err.clone()));
        }
    }
}
