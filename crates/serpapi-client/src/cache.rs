//! Per-day news cache.
//!
//! Search results are fetched at most once per Jakarta calendar day and kept
//! until evicted. There is no TTL: the bound is on the number of distinct
//! days, and the oldest inserted day goes first once it is exceeded.

use agri_core::{search_date, AgriResult, NewsItem, NewsSearchProvider};
use chrono::NaiveDate;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

pub const DEFAULT_CACHE_CAPACITY: usize = 50;

/// Insertion-ordered map of `search_date` -> results with a fixed capacity.
#[derive(Debug)]
pub struct NewsCache {
    entries: HashMap<String, Vec<NewsItem>>,
    order: VecDeque<String>,
    capacity: usize,
}

impl NewsCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: HashMap::with_capacity(capacity),
            order: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Vec<NewsItem>> {
        self.entries.get(key)
    }

    /// Stores `items` under `key`, returning the key evicted to make room, if any.
    ///
    /// Re-inserting an existing key replaces its value but keeps its original
    /// insertion position.
    pub fn insert(&mut self, key: String, items: Vec<NewsItem>) -> Option<String> {
        if let Some(existing) = self.entries.get_mut(&key) {
            *existing = items;
            return None;
        }

        self.order.push_back(key.clone());
        self.entries.insert(key, items);

        if self.order.len() > self.capacity {
            let oldest = self.order.pop_front()?;
            self.entries.remove(&oldest);
            return Some(oldest);
        }
        None
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// News retrieval backed by a [`NewsCache`].
///
/// All misses are serialized on a single `fetch_lock`, whatever day they ask
/// for, and re-check the cache once they hold it. Concurrent misses for the
/// same day therefore make one upstream call, while a miss for another day
/// waits its turn. Hits never wait on the lock.
pub struct NewsService {
    provider: Arc<dyn NewsSearchProvider>,
    cache: Mutex<NewsCache>,
    fetch_lock: tokio::sync::Mutex<()>,
}

impl NewsService {
    pub fn new(provider: Arc<dyn NewsSearchProvider>, capacity: usize) -> Self {
        Self {
            provider,
            cache: Mutex::new(NewsCache::new(capacity)),
            fetch_lock: tokio::sync::Mutex::new(()),
        }
    }

    fn cache(&self) -> MutexGuard<'_, NewsCache> {
        self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn cached(&self, key: &str) -> Option<Vec<NewsItem>> {
        self.cache().get(key).cloned()
    }

    /// Returns the news for `day`, calling the provider only on a cache miss.
    ///
    /// Failed fetches are not cached and leave existing entries untouched.
    pub async fn get_or_fetch(&self, day: NaiveDate) -> AgriResult<Vec<NewsItem>> {
        let key = search_date(day);

        if let Some(items) = self.cached(&key) {
            tracing::debug!("News cache hit for {}", key);
            return Ok(items);
        }

        let _guard = self.fetch_lock.lock().await;
        if let Some(items) = self.cached(&key) {
            tracing::debug!("News cache filled for {} while waiting", key);
            return Ok(items);
        }

        tracing::info!("News cache miss for {}, querying search provider", key);
        let mut items = self.provider.search_news().await.map_err(|e| {
            tracing::warn!("News search for {} failed: {}", key, e);
            e
        })?;

        for item in &mut items {
            item.search_date = key.clone();
        }

        if let Some(evicted) = self.cache().insert(key.clone(), items.clone()) {
            tracing::debug!("News cache evicted {}", evicted);
        }

        Ok(items)
    }

    pub fn cached_days(&self) -> usize {
        self.cache().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agri_core::AgriError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingProvider {
        calls: AtomicUsize,
        fail: bool,
    }

    impl CountingProvider {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                fail: false,
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                fail: true,
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl NewsSearchProvider for CountingProvider {
        async fn search_news(&self) -> AgriResult<Vec<NewsItem>> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(AgriError::UpstreamUnavailable("search down".to_string()));
            }
            Ok(vec![
                NewsItem::titled(format!("Berita {}", n)),
                NewsItem::titled("Harga beras stabil"),
            ])
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    #[test]
    fn test_cache_evicts_oldest_inserted() {
        let mut cache = NewsCache::new(2);
        assert_eq!(cache.insert("2024-06-01".into(), vec![]), None);
        assert_eq!(cache.insert("2024-06-02".into(), vec![]), None);

        // Reading the oldest entry does not protect it
        assert!(cache.get("2024-06-01").is_some());

        let evicted = cache.insert("2024-06-03".into(), vec![]);
        assert_eq!(evicted.as_deref(), Some("2024-06-01"));
        assert!(!cache.contains("2024-06-01"));
        assert!(cache.contains("2024-06-02"));
        assert!(cache.contains("2024-06-03"));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_cache_reinsert_keeps_position() {
        let mut cache = NewsCache::new(2);
        cache.insert("a".into(), vec![]);
        cache.insert("b".into(), vec![]);
        cache.insert("a".into(), vec![NewsItem::titled("baru")]);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("a").unwrap().len(), 1);

        assert_eq!(cache.insert("c".into(), vec![]).as_deref(), Some("a"));
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        assert_eq!(NewsCache::new(0).capacity(), 1);
    }

    #[tokio::test]
    async fn test_same_day_fetches_once() {
        let provider = CountingProvider::new();
        let service = NewsService::new(provider.clone(), DEFAULT_CACHE_CAPACITY);

        let first = service.get_or_fetch(day(1)).await.unwrap();
        let second = service.get_or_fetch(day(1)).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(provider.calls(), 1);
    }

    #[tokio::test]
    async fn test_items_tagged_with_search_date() {
        let service = NewsService::new(CountingProvider::new(), DEFAULT_CACHE_CAPACITY);
        let items = service.get_or_fetch(day(15)).await.unwrap();

        assert_eq!(items.len(), 2);
        assert!(items.iter().all(|i| i.search_date == "2024-06-15"));
    }

    #[tokio::test]
    async fn test_days_are_independent() {
        let provider = CountingProvider::new();
        let service = NewsService::new(provider.clone(), DEFAULT_CACHE_CAPACITY);

        let d1 = service.get_or_fetch(day(1)).await.unwrap();
        let d2 = service.get_or_fetch(day(2)).await.unwrap();
        let d1_again = service.get_or_fetch(day(1)).await.unwrap();

        assert_eq!(provider.calls(), 2);
        assert_eq!(d1, d1_again);
        assert_ne!(d1, d2);
        assert_eq!(service.cached_days(), 2);
    }

    #[tokio::test]
    async fn test_eviction_forces_refetch() {
        let provider = CountingProvider::new();
        let service = NewsService::new(provider.clone(), 2);

        service.get_or_fetch(day(1)).await.unwrap();
        service.get_or_fetch(day(2)).await.unwrap();
        service.get_or_fetch(day(3)).await.unwrap();
        assert_eq!(service.cached_days(), 2);

        service.get_or_fetch(day(1)).await.unwrap();
        assert_eq!(provider.calls(), 4);
    }

    #[tokio::test]
    async fn test_failure_is_not_cached() {
        let provider = CountingProvider::failing();
        let service = NewsService::new(provider.clone(), DEFAULT_CACHE_CAPACITY);

        assert!(matches!(
            service.get_or_fetch(day(1)).await,
            Err(AgriError::UpstreamUnavailable(_))
        ));
        assert!(service.get_or_fetch(day(1)).await.is_err());
        assert_eq!(provider.calls(), 2);
        assert_eq!(service.cached_days(), 0);
    }

    #[tokio::test]
    async fn test_concurrent_misses_share_one_fetch() {
        let provider = CountingProvider::new();
        let service = Arc::new(NewsService::new(provider.clone(), DEFAULT_CACHE_CAPACITY));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let service = service.clone();
                tokio::spawn(async move { service.get_or_fetch(day(7)).await })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap().unwrap();
        }
        assert_eq!(provider.calls(), 1);
    }
}
