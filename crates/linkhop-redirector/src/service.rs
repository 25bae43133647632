use std::sync::Arc;
use std::time::Duration;

use crate::redirector::{Redirector, Resolution, ResolutionSource};
use crate::RedirectorError;
use async_trait::async_trait;
use linkhop_core::{CacheError, CachedUrl, ReadRepository, ShortCode, UrlCache, CACHE_TTL};
use tracing::{debug, error, trace, warn};

/// Service for handling URL redirects.
///
/// Reads go through the cache first. On a miss, a malformed cache entry or
/// an unreachable cache, the durable repository is consulted and the cache
/// is repopulated on a best-effort basis.
#[derive(Debug, Clone)]
pub struct RedirectorService<R, C> {
    repository: Arc<R>,
    cache: Arc<C>,
    ttl: Duration,
}

impl<R: ReadRepository, C: UrlCache> RedirectorService<R, C> {
    /// Creates a new RedirectorService caching entries for [`CACHE_TTL`].
    pub fn new(repository: R, cache: C) -> Self {
        Self {
            repository: Arc::new(repository),
            cache: Arc::new(cache),
            ttl: CACHE_TTL,
        }
    }

    /// Overrides the lifetime of repopulated cache entries.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    async fn lookup_cache(&self, code: &ShortCode) -> Option<CachedUrl> {
        match self.cache.get_url(code).await {
            Ok(Some(entry)) => {
                debug!(code = %code, "cache hit");
                Some(entry)
            }
            Ok(None) => {
                trace!(code = %code, "cache miss");
                None
            }
            Err(CacheError::InvalidData(reason)) => {
                warn!(code = %code, reason = %reason, "malformed cache entry, falling back to store");
                None
            }
            Err(e) => {
                warn!(code = %code, error = %e, "cache read failed, falling back to store");
                None
            }
        }
    }

    async fn populate_cache(&self, code: &ShortCode, entry: &CachedUrl) {
        if let Err(e) = self.cache.set_url(code, entry, self.ttl).await {
            warn!(code = %code, error = %e, "failed to populate cache");
        }
    }
}

#[async_trait]
impl<R: ReadRepository, C: UrlCache> Redirector for RedirectorService<R, C> {
    async fn resolve(&self, code: &ShortCode) -> crate::Result<Option<Resolution>> {
        trace!(code = %code, "resolving short code");

        if let Some(entry) = self.lookup_cache(code).await {
            return Ok(Some(Resolution {
                original_url: entry.url,
                mapping_id: entry.id,
                source: ResolutionSource::Cache,
            }));
        }

        let mapping = match self.repository.get(code).await {
            Ok(Some(mapping)) => mapping,
            Ok(None) => {
                trace!(code = %code, "short code not found");
                return Ok(None);
            }
            Err(e) => {
                error!(code = %code, error = %e, "durable lookup failed");
                return Err(RedirectorError::from(e));
            }
        };

        self.populate_cache(code, &CachedUrl::from(&mapping)).await;

        debug!(code = %code, url = %mapping.original_url, "resolved short code from store");
        Ok(Some(Resolution {
            original_url: mapping.original_url,
            mapping_id: mapping.id,
            source: ResolutionSource::Store,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use linkhop_cache::MokaUrlCache;
    use linkhop_core::{Repository, ShortUrlMapping, StorageError};
    use linkhop_storage::InMemoryRepository;
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn code(s: &str) -> ShortCode {
        ShortCode::new_unchecked(s)
    }

    /// Counts reads, optionally failing all of them.
    #[derive(Default)]
    struct CountingRepository {
        inner: InMemoryRepository,
        reads: AtomicUsize,
        fail: bool,
    }

    impl CountingRepository {
        fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        fn reads(&self) -> usize {
            self.reads.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ReadRepository for CountingRepository {
        async fn get(
            &self,
            code: &ShortCode,
        ) -> linkhop_core::repository::Result<Option<ShortUrlMapping>> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(StorageError::Unavailable("connection refused".to_string()));
            }
            self.inner.get(code).await
        }
    }

    /// A scriptable cache that remembers every write.
    #[derive(Default)]
    struct FakeCache {
        entries: Mutex<HashMap<String, CachedUrl>>,
        writes: Mutex<Vec<(String, CachedUrl, Duration)>>,
        get_error: Option<CacheError>,
        set_error: Option<CacheError>,
    }

    impl FakeCache {
        fn with_entry(code: &str, entry: CachedUrl) -> Self {
            let cache = Self::default();
            cache.entries.lock().insert(code.to_string(), entry);
            cache
        }

        fn failing_reads(err: CacheError) -> Self {
            Self {
                get_error: Some(err),
                ..Self::default()
            }
        }

        fn failing_writes(err: CacheError) -> Self {
            Self {
                set_error: Some(err),
                ..Self::default()
            }
        }

        fn writes(&self) -> Vec<(String, CachedUrl, Duration)> {
            self.writes.lock().clone()
        }
    }

    #[async_trait]
    impl UrlCache for FakeCache {
        async fn get_url(&self, code: &ShortCode) -> linkhop_core::cache::Result<Option<CachedUrl>> {
            if let Some(err) = &self.get_error {
                return Err(err.clone());
            }
            Ok(self.entries.lock().get(code.as_str()).cloned())
        }

        async fn set_url(
            &self,
            code: &ShortCode,
            entry: &CachedUrl,
            ttl: Duration,
        ) -> linkhop_core::cache::Result<()> {
            self.writes
                .lock()
                .push((code.as_str().to_string(), entry.clone(), ttl));
            if let Some(err) = &self.set_error {
                return Err(err.clone());
            }
            self.entries
                .lock()
                .insert(code.as_str().to_string(), entry.clone());
            Ok(())
        }
    }

    async fn seeded_repository(c: &ShortCode, url: &str) -> (CountingRepository, ShortUrlMapping) {
        let repo = CountingRepository::default();
        let mapping = repo.inner.insert(c, url).await.unwrap();
        (repo, mapping)
    }

    #[tokio::test]
    async fn cache_hit_skips_store() {
        let c = code("abc123");
        let cache = FakeCache::with_entry(
            "abc123",
            CachedUrl {
                url: "https://example.com".to_string(),
                id: 7,
            },
        );
        let service = RedirectorService::new(CountingRepository::default(), cache);

        let resolution = service.resolve(&c).await.unwrap().unwrap();

        assert_eq!(resolution.original_url, "https://example.com");
        assert_eq!(resolution.mapping_id, 7);
        assert_eq!(resolution.source, ResolutionSource::Cache);
        assert_eq!(service.repository.reads(), 0);
        assert!(service.cache.writes().is_empty());
    }

    #[tokio::test]
    async fn cache_miss_reads_store_and_populates_cache() {
        let c = code("abc123");
        let (repo, mapping) = seeded_repository(&c, "https://example.com").await;
        let service = RedirectorService::new(repo, FakeCache::default());

        let resolution = service.resolve(&c).await.unwrap().unwrap();

        assert_eq!(resolution.original_url, "https://example.com");
        assert_eq!(resolution.mapping_id, mapping.id);
        assert_eq!(resolution.source, ResolutionSource::Store);
        assert_eq!(
            service.cache.writes(),
            vec![(
                "abc123".to_string(),
                CachedUrl {
                    url: "https://example.com".to_string(),
                    id: mapping.id,
                },
                CACHE_TTL,
            )]
        );
    }

    #[tokio::test]
    async fn second_resolve_is_served_from_cache() {
        let c = code("abc123");
        let (repo, _) = seeded_repository(&c, "https://example.com").await;
        let service = RedirectorService::new(repo, MokaUrlCache::new());

        let first = service.resolve(&c).await.unwrap().unwrap();
        let second = service.resolve(&c).await.unwrap().unwrap();

        assert_eq!(first.source, ResolutionSource::Store);
        assert_eq!(second.source, ResolutionSource::Cache);
        assert_eq!(first.original_url, second.original_url);
        assert_eq!(first.mapping_id, second.mapping_id);
        assert_eq!(service.repository.reads(), 1);
    }

    #[tokio::test]
    async fn unknown_code_does_not_write_cache() {
        let service = RedirectorService::new(CountingRepository::default(), FakeCache::default());

        assert!(service.resolve(&code("nope00")).await.unwrap().is_none());
        assert_eq!(service.repository.reads(), 1);
        assert!(service.cache.writes().is_empty());
    }

    #[tokio::test]
    async fn malformed_entry_falls_back_and_repopulates() {
        let c = code("abc123");
        let (repo, mapping) = seeded_repository(&c, "https://example.com").await;
        let cache = FakeCache::failing_reads(CacheError::InvalidData("expected value".to_string()));
        let service = RedirectorService::new(repo, cache);

        let resolution = service.resolve(&c).await.unwrap().unwrap();

        assert_eq!(resolution.original_url, "https://example.com");
        assert_eq!(resolution.source, ResolutionSource::Store);
        let writes = service.cache.writes();
        assert_eq!(writes.len(), 1);
        assert_eq!(writes[0].1.id, mapping.id);
    }

    #[tokio::test]
    async fn unavailable_cache_still_resolves() {
        let c = code("abc123");
        let (repo, _) = seeded_repository(&c, "https://example.com").await;
        let cache = FakeCache::failing_reads(CacheError::Unavailable("refused".to_string()));
        let service = RedirectorService::new(repo, cache);

        let resolution = service.resolve(&c).await.unwrap().unwrap();

        assert_eq!(resolution.original_url, "https://example.com");
        assert_eq!(service.repository.reads(), 1);
    }

    #[tokio::test]
    async fn failed_cache_write_still_resolves() {
        let c = code("abc123");
        let (repo, _) = seeded_repository(&c, "https://example.com").await;
        let cache = FakeCache::failing_writes(CacheError::Timeout("timed out".to_string()));
        let service = RedirectorService::new(repo, cache);

        let resolution = service.resolve(&c).await.unwrap().unwrap();

        assert_eq!(resolution.original_url, "https://example.com");
        assert_eq!(service.cache.writes().len(), 1);
    }

    #[tokio::test]
    async fn store_failure_is_an_error() {
        let service = RedirectorService::new(CountingRepository::failing(), FakeCache::default());

        let err = service.resolve(&code("abc123")).await.unwrap_err();

        assert!(matches!(
            err,
            RedirectorError::Storage(StorageError::Unavailable(_))
        ));
        assert!(service.cache.writes().is_empty());
    }

    #[tokio::test]
    async fn custom_ttl_is_used_for_population() {
        let c = code("abc123");
        let (repo, _) = seeded_repository(&c, "https://example.com").await;
        let service = RedirectorService::new(repo, FakeCache::default())
            .with_ttl(Duration::from_secs(60));

        service.resolve(&c).await.unwrap();

        assert_eq!(service.cache.writes()[0].2, Duration::from_secs(60));
    }

    #[tokio::test]
    async fn concurrent_misses_write_identical_entries() {
        let c = code("abc123");
        let (repo, mapping) = seeded_repository(&c, "https://example.com").await;
        let service = Arc::new(RedirectorService::new(repo, FakeCache::default()));

        let mut handles = vec![];
        for _ in 0..8 {
            let service = service.clone();
            let c = c.clone();
            handles.push(tokio::spawn(async move {
                service.resolve(&c).await.unwrap().unwrap()
            }));
        }
        for handle in handles {
            assert_eq!(handle.await.unwrap().original_url, "https://example.com");
        }

        let expected = CachedUrl {
            url: "https://example.com".to_string(),
            id: mapping.id,
        };
        for (_, entry, _) in service.cache.writes() {
            assert_eq!(entry, expected);
        }
    }
}
