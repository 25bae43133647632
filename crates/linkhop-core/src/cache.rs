use crate::error::CacheError;
use crate::repository::ShortUrlMapping;
use crate::shortcode::ShortCode;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Type alias for cache results.
pub type Result<T> = std::result::Result<T, CacheError>;

/// Lifetime of a cache entry, counted from the write.
pub const CACHE_TTL: Duration = Duration::from_secs(3600);

/// The cached copy of a [`ShortUrlMapping`].
///
/// Serialized as `{"url": ..., "id": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedUrl {
    pub url: String,
    pub id: i64,
}

impl From<&ShortUrlMapping> for CachedUrl {
    fn from(mapping: &ShortUrlMapping) -> Self {
        Self {
            url: mapping.original_url.clone(),
            id: mapping.id,
        }
    }
}

/// A cache for resolved short codes.
///
/// Entries are write-through copies of durable mappings and may vanish at
/// any time; callers must always be able to fall back to the store.
#[async_trait]
pub trait UrlCache: Send + Sync + 'static {
    /// Get a cached entry.
    ///
    /// Returns `Ok(None)` if the key is not in the cache, and
    /// `Err(CacheError::InvalidData)` if the stored payload is malformed.
    async fn get_url(&self, code: &ShortCode) -> Result<Option<CachedUrl>>;

    /// Store an entry that expires after `ttl`, overwriting any previous value.
    async fn set_url(&self, code: &ShortCode, entry: &CachedUrl, ttl: Duration) -> Result<()>;
}
