//! Remote image loading and in-memory caching.

pub mod fetcher;
pub mod memory_cache;

pub use fetcher::HttpImageFetcher;
pub use memory_cache::{CacheStats, DEFAULT_CACHE_SIZE, MemoryImageCache};
