use std::sync::Arc;

use tokio::time::Instant;

#[cfg(feature = "localcache")]
mod local_cache_test;
mod memory_cache_test;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Item {
    pub(crate) id: u32,
    pub(crate) name: String,
    // only filled in by the bulk query, placeholders leave it empty
    pub(crate) level: Option<u32>,
}

pub(crate) fn item(id: u32) -> Item {
    Item {
        id,
        name: format!("item-{id}"),
        level: Some(id * 10),
    }
}

pub(crate) fn placeholder(id: u32) -> Item {
    Item {
        id,
        name: format!("item-{id}"),
        level: None,
    }
}

/// Records every loader invocation with the (paused or real) time it ran.
#[derive(Clone, Default)]
pub(crate) struct Calls(Arc<parking_lot::Mutex<Vec<(Instant, Vec<u32>)>>>);

impl Calls {
    pub(crate) fn record(&self, keys: &[u32]) -> usize {
        let mut calls = self.0.lock();
        calls.push((Instant::now(), keys.to_vec()));
        calls.len() - 1
    }

    pub(crate) fn keys(&self) -> Vec<Vec<u32>> {
        self.0.lock().iter().map(|(_, k)| k.clone()).collect()
    }

    pub(crate) fn times(&self) -> Vec<Instant> {
        self.0.lock().iter().map(|(t, _)| *t).collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.0.lock().len()
    }
}

pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}
