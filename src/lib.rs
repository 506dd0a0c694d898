//! Coalesces single-key record lookups into debounced bulk fetches.
//!
//! Callers ask for one key at a time with [`AutoBatch::lookup`]. Cache hits
//! return immediately; misses are queued, and once no new request has arrived
//! for the debounce period the queue is flushed as one deduplicated call to
//! the bulk loader. Each returned record is written to the cache and handed to
//! every caller waiting on its key; keys the loader did not return resolve to
//! `None`, and a failed load is reported to every caller of that batch.
//!
//! ```no_run
//! use autobatch::{AutoBatch, MemoryCache};
//! use futures::FutureExt;
//!
//! # async fn run() -> Result<(), autobatch::AutoBatchError> {
//! let items = AutoBatch::builder()
//!     .cache(MemoryCache::<u32, String>::new())
//!     .loader(|ids: Vec<u32>| {
//!         async move { Ok(ids.into_iter().map(|id| (id, format!("item {id}"))).collect()) }
//!             .boxed()
//!     })
//!     .build()?;
//!
//! let _item = items.lookup(42).await?;
//! # Ok(())
//! # }
//! ```

mod autobatch;
mod batch;
mod builder;
mod cache;
mod error;
mod loader;
#[cfg(feature = "localcache")]
pub mod local_cache;
pub mod memory_cache;
mod options;

#[cfg(test)]
mod test;

pub use autobatch::{AutoBatch, MetricsFn};
pub use builder::AutoBatchBuilder;
pub use cache::Cache;
pub use error::AutoBatchError;
pub use loader::{Completeness, Loader};
pub use memory_cache::MemoryCache;
pub use options::Options;
