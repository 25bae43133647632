use ::redis::aio::MultiplexedConnection;
use ::redis::{AsyncCommands, RedisError};
use async_trait::async_trait;
use linkhop_core::cache::Result;
use linkhop_core::{CacheError, CachedUrl, ShortCode, UrlCache};
use std::time::Duration;
use tracing::{debug, trace, warn};

/// Key prefix shared with every other reader of the cache.
pub const DEFAULT_KEY_PREFIX: &str = "url:";

/// A Redis-based implementation of [`UrlCache`].
///
/// Entries are stored as JSON strings (`{"url": ..., "id": ...}`) under
/// `url:<code>` and written with `SETEX`. The multiplexed connection is
/// cloned per call, so one cache can serve any number of concurrent
/// requests.
#[derive(Debug, Clone)]
pub struct RedisUrlCache {
    conn: MultiplexedConnection,
    key_prefix: String,
}

fn map_redis_error(operation: &str, err: RedisError) -> CacheError {
    let message = format!("{operation}: {err}");
    if err.is_timeout() {
        CacheError::Timeout(message)
    } else if err.is_connection_refusal() || err.is_connection_dropped() || err.is_io_error() {
        CacheError::Unavailable(message)
    } else {
        CacheError::Operation(message)
    }
}

/// Decodes a cached payload.
///
/// A payload with the wrong shape, missing fields or an empty URL is
/// reported as [`CacheError::InvalidData`] so callers can treat it as a miss.
fn decode_entry(key: &str, raw: &str) -> Result<CachedUrl> {
    let entry: CachedUrl = serde_json::from_str(raw).map_err(|e| {
        CacheError::InvalidData(format!("invalid cached value for key '{key}': {e}"))
    })?;

    if entry.url.is_empty() {
        return Err(CacheError::InvalidData(format!(
            "cached value for key '{key}' has an empty url"
        )));
    }

    Ok(entry)
}

fn encode_entry(entry: &CachedUrl) -> Result<String> {
    serde_json::to_string(entry)
        .map_err(|e| CacheError::Serialization(format!("failed to serialize cache value: {e}")))
}

impl RedisUrlCache {
    /// Creates a new Redis URL cache.
    ///
    /// # Arguments
    ///
    /// * `conn` - A multiplexed Redis connection
    pub fn new(conn: MultiplexedConnection) -> Self {
        Self::with_prefix(conn, DEFAULT_KEY_PREFIX)
    }

    /// Creates a new Redis URL cache with a custom key prefix.
    ///
    /// # Arguments
    ///
    /// * `conn` - A multiplexed Redis connection
    /// * `key_prefix` - Custom prefix for cache keys (e.g., "myapp:url:")
    pub fn with_prefix(conn: MultiplexedConnection, key_prefix: impl Into<String>) -> Self {
        Self {
            conn,
            key_prefix: key_prefix.into(),
        }
    }

    /// Opens a connection to `redis_url` and verifies it with `PING`.
    pub async fn connect(redis_url: &str) -> Result<Self> {
        let client = ::redis::Client::open(redis_url)
            .map_err(|e| map_redis_error("invalid Redis url", e))?;
        let mut conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| map_redis_error("failed to connect to Redis", e))?;

        let pong: String = ::redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| map_redis_error("Redis did not answer PING", e))?;
        debug!(reply = %pong, "connected to Redis");

        Ok(Self::new(conn))
    }

    /// Generates the cache key for a short code.
    fn cache_key(&self, code: &ShortCode) -> String {
        format!("{}{}", self.key_prefix, code.as_str())
    }
}

#[async_trait]
impl UrlCache for RedisUrlCache {
    async fn get_url(&self, code: &ShortCode) -> Result<Option<CachedUrl>> {
        let key = self.cache_key(code);
        trace!(code = %code, "Fetching URL record from Redis cache");

        let mut conn = self.conn.clone();
        match conn.get::<_, Option<String>>(&key).await {
            Ok(Some(cached)) => {
                debug!(code = %code, "Cache hit in Redis");
                decode_entry(&key, &cached).map(Some)
            }
            Ok(None) => {
                trace!(code = %code, "Cache miss in Redis");
                Ok(None)
            }
            Err(e) => Err(map_redis_error("failed to fetch value from Redis", e)),
        }
    }

    async fn set_url(&self, code: &ShortCode, entry: &CachedUrl, ttl: Duration) -> Result<()> {
        let key = self.cache_key(code);
        trace!(code = %code, ttl_secs = ttl.as_secs(), "Storing URL record in Redis cache");

        let json = encode_entry(entry)?;

        // SETEX rejects a zero expiry.
        let seconds = ttl.as_secs().max(1);
        let mut conn = self.conn.clone();
        match conn.set_ex::<_, _, ()>(&key, json, seconds).await {
            Ok(()) => {
                debug!(code = %code, "Cached record in Redis");
                Ok(())
            }
            Err(e) => {
                warn!(code = %code, error = %e, "Failed to cache record in Redis");
                Err(map_redis_error("failed to write value to Redis", e))
            }
        }
    }
}
