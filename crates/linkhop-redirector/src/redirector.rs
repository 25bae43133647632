use crate::Result;
use async_trait::async_trait;
use linkhop_core::{ShortCode, StorageError};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum RedirectorError {
    /// The durable store could not answer the lookup. Callers report this as
    /// a server error, never as a not-found.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Where a resolved URL came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionSource {
    Cache,
    Store,
}

/// A successfully resolved short code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub original_url: String,
    /// Id of the durable mapping, used to attribute visits.
    pub mapping_id: i64,
    pub source: ResolutionSource,
}

#[async_trait]
pub trait Redirector: Send + Sync + 'static {
    /// Resolves a short code to its original URL.
    /// Returns `None` if the code does not exist.
    async fn resolve(&self, code: &ShortCode) -> Result<Option<Resolution>>;
}
