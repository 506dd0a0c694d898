use std::sync::Arc;

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum AutoBatchError {
    #[error("bulk fetch failed: {0}")]
    Fetch(Arc<anyhow::Error>),
    #[error("no such key")]
    NoSuchKey,
    #[error("batch worker stopped")]
    Stopped,
    #[error("request canceled before it was settled")]
    Canceled,
    #[error("no loader configured")]
    MissingLoader,
    #[error("no cache configured")]
    MissingCache,
}
