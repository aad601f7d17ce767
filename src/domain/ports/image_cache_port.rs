//! Port definitions for remote image loading and caching.

use std::sync::Arc;

use bytes::Bytes;

use crate::domain::entities::Bitmap;

/// Result type for image fetch operations.
pub type CacheResult<T> = std::result::Result<T, CacheError>;

/// Reasons an image could not be loaded.
///
/// These never reach cache callers; they are logged and collapsed into a
/// missing image.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CacheError {
    /// Transport level failure (DNS, connect, timeout, body read).
    #[error("Network error: {0}")]
    NetworkError(String),
    /// The server answered with a non-2xx status.
    #[error("HTTP status {0}")]
    HttpStatus(u16),
    /// The body was not a decodable image.
    #[error("Decode error: {0}")]
    DecodeError(String),
}

/// Fetches encoded image bytes from an absolute URL.
#[async_trait::async_trait]
pub trait ImageFetcherPort: Send + Sync {
    /// Performs a GET and returns the body of a 2xx response.
    async fn fetch(&self, url: &str) -> CacheResult<Bytes>;
}

/// Bounded URL to bitmap cache.
/// Implementations must be thread-safe.
#[async_trait::async_trait]
pub trait ImageCachePort: Send + Sync {
    /// Returns the bitmap for `url`, fetching and caching it on a miss.
    /// Returns `None` for blank URLs and on any failure.
    async fn get(&self, url: Option<&str>) -> Option<Arc<Bitmap>>;

    /// Returns true if `url` is currently cached.
    fn contains(&self, url: &str) -> bool;

    /// Returns the current number of cached images.
    fn len(&self) -> usize;

    /// Returns true if the cache is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Releases every cached image.
    fn clear(&self);
}

/// Scripted image fetcher for tests.
#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::io::Cursor;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use parking_lot::Mutex;
    use tokio::sync::Barrier;

    /// Encodes a blank PNG of the given size.
    pub fn png_bytes(width: u32, height: u32) -> Bytes {
        let mut buf = Cursor::new(Vec::new());
        image::DynamicImage::new_rgb8(width, height)
            .write_to(&mut buf, image::ImageFormat::Png)
            .expect("encode test png");
        Bytes::from(buf.into_inner())
    }

    #[derive(Clone)]
    enum Reply {
        Body(Bytes),
        Status(u16),
    }

    /// Scripted fetcher that counts calls per URL.
    #[derive(Default)]
    pub struct MockImageFetcher {
        replies: Mutex<HashMap<String, Reply>>,
        calls: Mutex<HashMap<String, usize>>,
        total: AtomicUsize,
        gate: Option<Arc<Barrier>>,
    }

    impl MockImageFetcher {
        /// Creates a fetcher with no scripted replies.
        pub fn new() -> Self {
            Self::default()
        }

        /// Makes every fetch wait until `parties` fetches are in flight.
        pub fn gated(parties: usize) -> Self {
            Self {
                gate: Some(Arc::new(Barrier::new(parties))),
                ..Self::default()
            }
        }

        /// Returns the barrier of a gated fetcher so a test can join it.
        pub fn gate(&self) -> Option<Arc<Barrier>> {
            self.gate.clone()
        }

        /// Serves a decodable PNG for `url`.
        pub fn with_image(self, url: &str, width: u32, height: u32) -> Self {
            self.with_body(url, png_bytes(width, height))
        }

        /// Serves raw bytes for `url`.
        pub fn with_body(self, url: &str, body: Bytes) -> Self {
            self.replies.lock().insert(url.to_string(), Reply::Body(body));
            self
        }

        /// Answers `url` with an HTTP error status.
        pub fn with_status(self, url: &str, status: u16) -> Self {
            self.replies
                .lock()
                .insert(url.to_string(), Reply::Status(status));
            self
        }

        /// Number of fetches for `url`.
        pub fn calls_for(&self, url: &str) -> usize {
            self.calls.lock().get(url).copied().unwrap_or(0)
        }

        /// Total number of fetches.
        pub fn total_calls(&self) -> usize {
            self.total.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl ImageFetcherPort for MockImageFetcher {
        async fn fetch(&self, url: &str) -> CacheResult<Bytes> {
            *self.calls.lock().entry(url.to_string()).or_default() += 1;
            self.total.fetch_add(1, Ordering::SeqCst);

            if let Some(gate) = &self.gate {
                gate.wait().await;
            }

            let reply = self.replies.lock().get(url).cloned();
            match reply {
                Some(Reply::Body(body)) => Ok(body),
                Some(Reply::Status(status)) => Err(CacheError::HttpStatus(status)),
                None => Err(CacheError::NetworkError(format!("no route to {url}"))),
            }
        }
    }
}
