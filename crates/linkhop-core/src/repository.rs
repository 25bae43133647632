use crate::error::StorageError;
use crate::shortcode::ShortCode;
use async_trait::async_trait;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// Type alias for repository results.
pub type Result<T> = std::result::Result<T, StorageError>;

/// A persisted mapping from a short code to its original URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShortUrlMapping {
    /// Store-assigned identifier, immutable once created.
    pub id: i64,
    /// The unique short code.
    pub code: ShortCode,
    /// The original URL that was shortened.
    pub original_url: String,
    /// When the mapping was persisted.
    pub created_at: Timestamp,
}

/// One recorded redirect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Visit {
    /// Id of the [`ShortUrlMapping`] that was resolved.
    pub mapping_id: i64,
    pub client_ip: String,
    pub user_agent: String,
}

/// A read-only view of the durable store.
///
/// The redirector only ever needs this half of [`Repository`].
#[async_trait]
pub trait ReadRepository: Send + Sync + 'static {
    /// Retrieves the mapping for a given short code.
    /// Returns `None` if the code does not exist.
    async fn get(&self, code: &ShortCode) -> Result<Option<ShortUrlMapping>>;
}

#[async_trait]
pub trait Repository: ReadRepository {
    /// Persists a new mapping and returns it with its assigned id.
    ///
    /// Returns `Err(StorageError::Conflict)` if the code is already taken.
    async fn insert(&self, code: &ShortCode, original_url: &str) -> Result<ShortUrlMapping>;
}

/// Append-only sink for redirect analytics.
#[async_trait]
pub trait VisitRepository: Send + Sync + 'static {
    /// Appends a visit. Visits are never updated or deleted.
    async fn record_visit(&self, visit: &Visit) -> Result<()>;
}
