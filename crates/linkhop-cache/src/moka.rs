use ::moka::future::Cache;
use ::moka::Expiry;
use async_trait::async_trait;
use linkhop_core::cache::Result;
use linkhop_core::{CachedUrl, ShortCode, UrlCache};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

const DEFAULT_MAX_CAPACITY: u64 = 10_000;

#[derive(Debug, Clone)]
struct Entry {
    value: CachedUrl,
    ttl: Duration,
}

/// Expires every entry after the TTL it was written with.
struct PerEntryTtl;

impl Expiry<String, Entry> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        entry: &Entry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }

    // An overwrite restarts the clock, matching SETEX.
    fn expire_after_update(
        &self,
        _key: &String,
        entry: &Entry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(entry.ttl)
    }
}

/// An in-memory cache implementation using Moka.
///
/// Intended for single-node deployments and tests, where running Redis is
/// not worth it. Each entry honours the TTL passed to
/// [`UrlCache::set_url`].
#[derive(Debug, Clone)]
pub struct MokaUrlCache {
    cache: Cache<String, Entry>,
}

impl MokaUrlCache {
    /// Creates a new Moka URL cache holding at most 10,000 entries.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_CAPACITY)
    }

    /// Creates a new Moka URL cache with a custom maximum capacity.
    pub fn with_capacity(max_capacity: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(PerEntryTtl)
            .build();
        Self { cache }
    }
}

impl Default for MokaUrlCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UrlCache for MokaUrlCache {
    async fn get_url(&self, code: &ShortCode) -> Result<Option<CachedUrl>> {
        trace!(code = %code, "Fetching URL record from Moka cache");

        match self.cache.get(code.as_str()).await {
            Some(entry) => {
                debug!(code = %code, "Cache hit in Moka");
                Ok(Some(entry.value))
            }
            None => {
                trace!(code = %code, "Cache miss in Moka");
                Ok(None)
            }
        }
    }

    async fn set_url(&self, code: &ShortCode, entry: &CachedUrl, ttl: Duration) -> Result<()> {
        trace!(code = %code, "Storing URL record in Moka cache");

        let entry = Entry {
            value: entry.clone(),
            ttl,
        };
        self.cache.insert(code.as_str().to_string(), entry).await;
        debug!(code = %code, "Cached record in Moka");
        Ok(())
    }
}
