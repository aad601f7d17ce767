//! Bounded in-memory image cache with insertion-order eviction.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use futures_util::future::join_all;
use parking_lot::Mutex;
use tracing::{debug, trace, warn};

use crate::domain::entities::Bitmap;
use crate::domain::ports::{CacheError, CacheResult, ImageCachePort, ImageFetcherPort};

/// Default maximum number of images kept in memory.
pub const DEFAULT_CACHE_SIZE: usize = 100;

/// Map and insertion queue, always holding the same set of keys.
#[derive(Default)]
struct Entries {
    images: HashMap<String, Arc<Bitmap>>,
    insertion_order: VecDeque<String>,
}

impl Entries {
    /// Drops the oldest inserted entries until at most `capacity` remain.
    fn evict_over(&mut self, capacity: usize) -> Vec<(String, Arc<Bitmap>)> {
        let mut evicted = Vec::new();
        while self.images.len() > capacity {
            let Some(oldest) = self.insertion_order.pop_front() else {
                break;
            };
            if let Some(bitmap) = self.images.remove(&oldest) {
                evicted.push((oldest, bitmap));
            }
        }
        evicted
    }
}

/// URL to bitmap cache shared by every image consumer.
///
/// Eviction is FIFO by insertion: a cache hit does not refresh an entry.
/// Fetching and decoding run outside the lock, so misses for different URLs
/// proceed in parallel; two misses for the same URL may both fetch, but only
/// the first decode to reach the lock is kept.
pub struct MemoryImageCache {
    fetcher: Arc<dyn ImageFetcherPort>,
    capacity: usize,
    entries: Mutex<Entries>,
    hits: AtomicU64,
    misses: AtomicU64,
    failures: AtomicU64,
    evictions: AtomicU64,
}

impl MemoryImageCache {
    /// Creates a cache holding at most `capacity` images (minimum 1).
    #[must_use]
    pub fn new(fetcher: Arc<dyn ImageFetcherPort>, capacity: usize) -> Self {
        Self {
            fetcher,
            capacity: capacity.max(1),
            entries: Mutex::new(Entries::default()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            failures: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    /// Creates a cache with the default capacity.
    #[must_use]
    pub fn with_default_capacity(fetcher: Arc<dyn ImageFetcherPort>) -> Self {
        Self::new(fetcher, DEFAULT_CACHE_SIZE)
    }

    /// Maximum number of cached images.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns a cached image without fetching on a miss.
    #[must_use]
    pub fn peek(&self, url: &str) -> Option<Arc<Bitmap>> {
        self.entries.lock().images.get(url).cloned()
    }

    /// Loads several images concurrently, preserving input order.
    pub async fn get_all<S: AsRef<str> + Sync>(&self, urls: &[Option<S>]) -> Vec<Option<Arc<Bitmap>>> {
        join_all(
            urls.iter()
                .map(|url| self.get(url.as_ref().map(AsRef::as_ref))),
        )
        .await
    }

    /// Returns cache statistics.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        let hit_rate = if total > 0 {
            (hits as f64 / total as f64) * 100.0
        } else {
            0.0
        };
        CacheStats {
            hits,
            misses,
            failures: self.failures.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            hit_rate,
            size: self.len(),
            capacity: self.capacity,
        }
    }

    async fn fetch_and_decode(&self, url: &str) -> CacheResult<Bitmap> {
        let bytes = self.fetcher.fetch(url).await?;

        tokio::task::spawn_blocking(move || Bitmap::decode(&bytes))
            .await
            .map_err(|e| CacheError::DecodeError(format!("Decode task panicked: {e}")))?
            .map_err(|e| CacheError::DecodeError(format!("Failed to decode image: {e}")))
    }

    /// Inserts a fresh decode unless another task already cached `url`.
    fn insert(&self, url: &str, bitmap: Bitmap) -> Arc<Bitmap> {
        let (stored, evicted) = {
            let mut entries = self.entries.lock();

            if let Some(existing) = entries.images.get(url) {
                debug!(url = %url, "Image cached concurrently, discarding duplicate decode");
                return existing.clone();
            }

            let bitmap = Arc::new(bitmap);
            entries.images.insert(url.to_string(), bitmap.clone());
            entries.insertion_order.push_back(url.to_string());
            let evicted = entries.evict_over(self.capacity);
            (bitmap, evicted)
        };

        debug!(url = %url, "Stored image in memory cache");

        if !evicted.is_empty() {
            self.evictions
                .fetch_add(evicted.len() as u64, Ordering::Relaxed);
            for (key, _) in &evicted {
                debug!(url = %key, "Evicted image from memory cache");
            }
        }

        stored
    }
}

/// Statistics about cache performance.
#[derive(Debug, Clone)]
pub struct CacheStats {
    /// Number of cache hits.
    pub hits: u64,
    /// Number of cache misses.
    pub misses: u64,
    /// Misses that ended without an image.
    pub failures: u64,
    /// Entries removed to honor the capacity.
    pub evictions: u64,
    /// Hit rate as a percentage.
    pub hit_rate: f64,
    /// Current number of cached images.
    pub size: usize,
    /// Maximum number of cached images.
    pub capacity: usize,
}

impl std::fmt::Display for CacheStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Cache: {}/{} images, {:.1}% hit rate ({} hits, {} misses, {} failed, {} evicted)",
            self.size,
            self.capacity,
            self.hit_rate,
            self.hits,
            self.misses,
            self.failures,
            self.evictions
        )
    }
}

#[async_trait::async_trait]
impl ImageCachePort for MemoryImageCache {
    async fn get(&self, url: Option<&str>) -> Option<Arc<Bitmap>> {
        let url = url.filter(|u| !u.trim().is_empty())?;

        if let Some(bitmap) = self.peek(url) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            trace!(url = %url, "Memory cache hit");
            return Some(bitmap);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        trace!(url = %url, "Memory cache miss");

        match self.fetch_and_decode(url).await {
            Ok(bitmap) => Some(self.insert(url, bitmap)),
            Err(e) => {
                self.failures.fetch_add(1, Ordering::Relaxed);
                warn!(url = %url, error = %e, "Failed to load image");
                None
            }
        }
    }

    fn contains(&self, url: &str) -> bool {
        self.entries.lock().images.contains_key(url)
    }

    fn len(&self) -> usize {
        self.entries.lock().images.len()
    }

    fn clear(&self) {
        let released = {
            let mut entries = self.entries.lock();
            entries.insertion_order.clear();
            std::mem::take(&mut entries.images)
        };
        debug!(count = released.len(), "Cleared memory image cache");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::mocks::MockImageFetcher;

    const URL: &str = "http://x/img.png";

    fn cache_with(fetcher: MockImageFetcher, capacity: usize) -> (MemoryImageCache, Arc<MockImageFetcher>) {
        let fetcher = Arc::new(fetcher);
        (MemoryImageCache::new(fetcher.clone(), capacity), fetcher)
    }

    fn keys_in_order(cache: &MemoryImageCache) -> Vec<String> {
        cache.entries.lock().insertion_order.iter().cloned().collect()
    }

    fn assert_lockstep(cache: &MemoryImageCache) {
        let entries = cache.entries.lock();
        assert_eq!(entries.images.len(), entries.insertion_order.len());
        for key in &entries.insertion_order {
            assert!(entries.images.contains_key(key), "{key} missing from map");
        }
    }

    #[tokio::test]
    async fn test_cache_miss_fetches_and_stores() {
        let (cache, fetcher) = cache_with(MockImageFetcher::new().with_image(URL, 8, 6), 10);

        let bitmap = cache.get(Some(URL)).await.unwrap();

        assert_eq!((bitmap.width(), bitmap.height()), (8, 6));
        assert!(cache.contains(URL));
        assert_eq!(fetcher.calls_for(URL), 1);
    }

    #[tokio::test]
    async fn test_cache_hit_does_not_fetch() {
        let (cache, fetcher) = cache_with(MockImageFetcher::new().with_image(URL, 2, 2), 10);

        let first = cache.get(Some(URL)).await.unwrap();
        let second = cache.get(Some(URL)).await.unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(fetcher.calls_for(URL), 1);
    }

    #[tokio::test]
    async fn test_blank_url_short_circuits() {
        let (cache, fetcher) = cache_with(MockImageFetcher::new(), 10);

        assert!(cache.get(None).await.is_none());
        assert!(cache.get(Some("")).await.is_none());
        assert!(cache.get(Some("   ")).await.is_none());

        assert_eq!(fetcher.total_calls(), 0);
        assert_eq!(cache.stats().misses, 0);
    }

    #[tokio::test]
    async fn test_http_error_is_not_cached() {
        let missing = "http://x/missing.png";
        let (cache, fetcher) = cache_with(MockImageFetcher::new().with_status(missing, 404), 10);

        assert!(cache.get(Some(missing)).await.is_none());
        assert!(cache.is_empty());

        assert!(cache.get(Some(missing)).await.is_none());
        assert_eq!(fetcher.calls_for(missing), 2);
        assert_eq!(cache.stats().failures, 2);
    }

    #[tokio::test]
    async fn test_network_and_decode_failures_are_not_cached() {
        let corrupt = "http://x/corrupt.png";
        let (cache, fetcher) = cache_with(
            MockImageFetcher::new().with_body(corrupt, bytes::Bytes::from_static(b"<html>")),
            10,
        );

        assert!(cache.get(Some(corrupt)).await.is_none());
        assert!(cache.get(Some("http://x/unroutable.png")).await.is_none());
        assert!(cache.get(Some(corrupt)).await.is_none());

        assert!(cache.is_empty());
        assert_eq!(fetcher.calls_for(corrupt), 2);
    }

    #[tokio::test]
    async fn test_fifo_eviction_scenario() {
        let fetcher = MockImageFetcher::new()
            .with_image("a", 1, 1)
            .with_image("b", 1, 1)
            .with_image("c", 1, 1);
        let (cache, _) = cache_with(fetcher, 2);

        for url in ["a", "b", "c"] {
            assert!(cache.get(Some(url)).await.is_some());
        }

        assert!(!cache.contains("a"));
        assert!(cache.contains("b"));
        assert!(cache.contains("c"));
        assert_eq!(keys_in_order(&cache), vec!["b", "c"]);
        assert_eq!(cache.stats().evictions, 1);
    }

    #[tokio::test]
    async fn test_hits_do_not_refresh_eviction_order() {
        let fetcher = MockImageFetcher::new()
            .with_image("a", 1, 1)
            .with_image("b", 1, 1)
            .with_image("c", 1, 1);
        let (cache, _) = cache_with(fetcher, 2);

        cache.get(Some("a")).await.unwrap();
        cache.get(Some("b")).await.unwrap();
        // Reading "a" would save it under LRU; insertion order still evicts it.
        cache.get(Some("a")).await.unwrap();
        cache.get(Some("c")).await.unwrap();

        assert!(!cache.contains("a"));
        assert!(cache.contains("b"));
    }

    #[tokio::test]
    async fn test_capacity_holds_after_every_insert() {
        let mut fetcher = MockImageFetcher::new();
        let urls: Vec<String> = (0..20).map(|i| format!("http://x/{i}.png")).collect();
        for url in &urls {
            fetcher = fetcher.with_image(url, 1, 1);
        }
        let (cache, _) = cache_with(fetcher, 5);

        for url in &urls {
            cache.get(Some(url)).await.unwrap();
            assert!(cache.len() <= 5);
            assert_lockstep(&cache);
        }

        assert_eq!(keys_in_order(&cache), urls[15..].to_vec());
    }

    #[tokio::test]
    async fn test_eviction_releases_bitmap() {
        let fetcher = MockImageFetcher::new()
            .with_image("a", 1, 1)
            .with_image("b", 1, 1);
        let (cache, _) = cache_with(fetcher, 1);

        let a = cache.get(Some("a")).await.unwrap();
        let released = Arc::downgrade(&a);
        drop(a);

        cache.get(Some("b")).await.unwrap();

        assert!(released.upgrade().is_none());
    }

    #[tokio::test]
    async fn test_concurrent_same_url_keeps_one_entry() {
        let (cache, fetcher) = cache_with(MockImageFetcher::gated(2).with_image(URL, 3, 3), 100);

        let (first, second) = tokio::join!(cache.get(Some(URL)), cache.get(Some(URL)));
        let (first, second) = (first.unwrap(), second.unwrap());

        assert_eq!(fetcher.calls_for(URL), 2);
        assert_eq!(cache.len(), 1);
        assert!(Arc::ptr_eq(&first, &second));
        // cache + two callers; the losing decode was dropped
        assert_eq!(Arc::strong_count(&first), 3);
        assert_lockstep(&cache);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_many_racing_tasks_share_one_bitmap() {
        let (cache, fetcher) = cache_with(MockImageFetcher::gated(8).with_image(URL, 2, 2), 100);
        let cache = Arc::new(cache);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = cache.clone();
                tokio::spawn(async move { cache.get(Some(URL)).await })
            })
            .collect();

        let mut results = Vec::new();
        for handle in handles {
            results.push(handle.await.unwrap().unwrap());
        }

        assert_eq!(fetcher.calls_for(URL), 8);
        assert_eq!(cache.len(), 1);
        assert!(results.iter().all(|r| Arc::ptr_eq(r, &results[0])));
    }

    #[tokio::test]
    async fn test_clear_releases_everything() {
        let fetcher = MockImageFetcher::new()
            .with_image("a", 1, 1)
            .with_image("b", 1, 1)
            .with_image("c", 1, 1);
        let (cache, fetcher) = cache_with(fetcher, 10);

        let mut released = Vec::new();
        for url in ["a", "b", "c"] {
            let bitmap = cache.get(Some(url)).await.unwrap();
            released.push(Arc::downgrade(&bitmap));
        }

        cache.clear();

        assert!(cache.is_empty());
        assert!(keys_in_order(&cache).is_empty());
        assert!(released.iter().all(|weak| weak.upgrade().is_none()));

        cache.get(Some("a")).await.unwrap();
        assert_eq!(fetcher.calls_for("a"), 2);
    }

    #[tokio::test]
    async fn test_clear_does_not_cancel_in_flight_fetch() {
        let fetcher = Arc::new(MockImageFetcher::gated(2).with_image(URL, 1, 1));
        let gate = fetcher.gate().unwrap();
        let cache = Arc::new(MemoryImageCache::new(fetcher.clone(), 10));
        let old = Arc::downgrade(
            &cache.insert("http://x/old.png", Bitmap::new(image::DynamicImage::new_rgb8(1, 1))),
        );

        let pending = {
            let cache = cache.clone();
            tokio::spawn(async move { cache.get(Some(URL)).await })
        };
        while fetcher.total_calls() == 0 {
            tokio::task::yield_now().await;
        }

        cache.clear();
        assert!(cache.is_empty());
        assert!(old.upgrade().is_none());

        gate.wait().await;

        assert!(pending.await.unwrap().is_some());
        assert!(cache.contains(URL));
        assert!(!cache.contains("http://x/old.png"));
        assert_eq!(keys_in_order(&cache), vec![URL.to_string()]);
        assert_lockstep(&cache);
    }

    #[tokio::test]
    async fn test_url_is_cached_as_given() {
        let padded = " http://x/img.png";
        let (cache, fetcher) = cache_with(
            MockImageFetcher::new()
                .with_image(URL, 1, 1)
                .with_image(padded, 2, 2),
            10,
        );

        cache.get(Some(URL)).await.unwrap();
        let bitmap = cache.get(Some(padded)).await.unwrap();

        assert_eq!(bitmap.width(), 2);
        assert_eq!(cache.len(), 2);
        assert_eq!(fetcher.calls_for(padded), 1);
        assert_eq!(keys_in_order(&cache), vec![URL.to_string(), padded.to_string()]);
    }

    #[tokio::test]
    async fn test_get_all_preserves_order() {
        let fetcher = MockImageFetcher::new()
            .with_image("a", 1, 1)
            .with_image("b", 2, 2);
        let (cache, _) = cache_with(fetcher, 10);

        let urls = [Some("a"), None, Some("missing"), Some("b")];
        let results = cache.get_all(&urls).await;

        assert_eq!(results.len(), 4);
        assert_eq!(results[0].as_ref().map(|b| b.width()), Some(1));
        assert!(results[1].is_none());
        assert!(results[2].is_none());
        assert_eq!(results[3].as_ref().map(|b| b.width()), Some(2));
    }

    #[tokio::test]
    async fn test_cache_stats() {
        let (cache, _) = cache_with(MockImageFetcher::new().with_image(URL, 1, 1), 10);

        cache.get(Some(URL)).await;
        cache.get(Some(URL)).await;
        cache.get(Some("http://x/none")).await;

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 2);
        assert_eq!(stats.failures, 1);
        assert_eq!(stats.size, 1);
        assert!(stats.to_string().starts_with("Cache: 1/10 images"));
    }

    #[test]
    fn test_default_capacity() {
        let cache = MemoryImageCache::with_default_capacity(Arc::new(MockImageFetcher::new()));
        assert_eq!(cache.capacity(), 100);
    }

    #[test]
    fn test_zero_capacity_is_clamped() {
        let cache = MemoryImageCache::new(Arc::new(MockImageFetcher::new()), 0);
        assert_eq!(cache.capacity(), 1);
    }
}
