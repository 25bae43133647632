use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use jiff::Timestamp;
use linkhop_core::repository::{ReadRepository, Repository, Result, VisitRepository};
use linkhop_core::{ShortCode, ShortUrlMapping, StorageError, Visit};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

#[derive(Debug, Default)]
struct Inner {
    mappings: DashMap<String, ShortUrlMapping>,
    next_id: AtomicI64,
    visits: Mutex<Vec<Visit>>,
}

/// In-memory implementation of the repository traits.
///
/// Mappings live in a `DashMap` keyed by short code; ids are handed out
/// from a counter starting at 1. Clones share the same storage, so one
/// instance can back both the shortener and the redirector.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    inner: Arc<Inner>,
}

impl InMemoryRepository {
    /// Creates a new in-memory repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored mappings.
    pub fn len(&self) -> usize {
        self.inner.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.mappings.is_empty()
    }

    /// Snapshot of every recorded visit, oldest first.
    pub fn visits(&self) -> Vec<Visit> {
        self.inner.visits.lock().clone()
    }
}

#[async_trait]
impl ReadRepository for InMemoryRepository {
    async fn get(&self, code: &ShortCode) -> Result<Option<ShortUrlMapping>> {
        Ok(self
            .inner
            .mappings
            .get(code.as_str())
            .map(|entry| entry.clone()))
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn insert(&self, code: &ShortCode, original_url: &str) -> Result<ShortUrlMapping> {
        // The entry guard holds the shard lock, making check-and-insert atomic.
        match self.inner.mappings.entry(code.as_str().to_owned()) {
            Entry::Occupied(_) => Err(StorageError::Conflict(code.to_string())),
            Entry::Vacant(slot) => {
                let mapping = ShortUrlMapping {
                    id: self.inner.next_id.fetch_add(1, Ordering::SeqCst) + 1,
                    code: code.clone(),
                    original_url: original_url.to_owned(),
                    created_at: Timestamp::now(),
                };
                slot.insert(mapping.clone());
                Ok(mapping)
            }
        }
    }
}

#[async_trait]
impl VisitRepository for InMemoryRepository {
    async fn record_visit(&self, visit: &Visit) -> Result<()> {
        if !self
            .inner
            .mappings
            .iter()
            .any(|entry| entry.value().id == visit.mapping_id)
        {
            return Err(StorageError::Query(format!(
                "visit references unknown mapping id {}",
                visit.mapping_id
            )));
        }

        self.inner.visits.lock().push(visit.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(s: &str) -> ShortCode {
        ShortCode::new_unchecked(s)
    }

    fn visit(mapping_id: i64) -> Visit {
        Visit {
            mapping_id,
            client_ip: "127.0.0.1".to_string(),
            user_agent: "curl/8.0".to_string(),
        }
    }

    #[tokio::test]
    async fn insert_and_get() {
        let repo = InMemoryRepository::new();

        let inserted = repo.insert(&code("abc123"), "https://example.com").await.unwrap();
        assert_eq!(inserted.id, 1);
        assert_eq!(inserted.code, code("abc123"));

        let got = repo.get(&code("abc123")).await.unwrap().unwrap();
        assert_eq!(got, inserted);
    }

    #[tokio::test]
    async fn get_nonexistent() {
        let repo = InMemoryRepository::new();

        assert!(repo.get(&code("nope00")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn insert_conflict_keeps_original() {
        let repo = InMemoryRepository::new();

        repo.insert(&code("abc123"), "https://one.example").await.unwrap();
        let err = repo
            .insert(&code("abc123"), "https://two.example")
            .await
            .unwrap_err();

        assert!(matches!(err, StorageError::Conflict(_)));
        assert_eq!(repo.len(), 1);
        let got = repo.get(&code("abc123")).await.unwrap().unwrap();
        assert_eq!(got.original_url, "https://one.example");
    }

    #[tokio::test]
    async fn ids_are_sequential() {
        let repo = InMemoryRepository::new();

        let a = repo.insert(&code("aaaaaa"), "https://a.example").await.unwrap();
        let b = repo.insert(&code("bbbbbb"), "https://b.example").await.unwrap();

        assert_eq!((a.id, b.id), (1, 2));
    }

    #[tokio::test]
    async fn records_visits_for_known_mappings() {
        let repo = InMemoryRepository::new();
        let mapping = repo.insert(&code("abc123"), "https://example.com").await.unwrap();

        repo.record_visit(&visit(mapping.id)).await.unwrap();
        repo.record_visit(&visit(mapping.id)).await.unwrap();

        assert_eq!(repo.visits(), vec![visit(mapping.id), visit(mapping.id)]);
    }

    #[tokio::test]
    async fn rejects_visit_for_unknown_mapping() {
        let repo = InMemoryRepository::new();

        assert!(repo.record_visit(&visit(99)).await.is_err());
        assert!(repo.visits().is_empty());
    }

    #[tokio::test]
    async fn clones_share_storage() {
        let repo = InMemoryRepository::new();
        let other = repo.clone();

        repo.insert(&code("abc123"), "https://example.com").await.unwrap();

        assert!(other.get(&code("abc123")).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn concurrent_inserts_of_same_code_yield_one_mapping() {
        let repo = InMemoryRepository::new();
        let mut handles = vec![];

        for i in 0..16 {
            let repo = repo.clone();
            handles.push(tokio::spawn(async move {
                repo.insert(&code("same00"), &format!("https://example{}.com", i))
                    .await
                    .is_ok()
            }));
        }

        let mut successes = 0;
        for handle in handles {
            if handle.await.unwrap() {
                successes += 1;
            }
        }

        assert_eq!(successes, 1);
        assert_eq!(repo.len(), 1);
    }
}
