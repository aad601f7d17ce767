//! Decoded image handle.

use std::fmt;

/// A decoded raster image owned by the image cache.
///
/// Bitmaps are shared as `Arc<Bitmap>`; the cache releases its reference on
/// eviction or clear, and the pixel buffer is freed once the last holder drops.
pub struct Bitmap {
    image: image::DynamicImage,
}

impl Bitmap {
    /// Wraps an already decoded image.
    #[must_use]
    pub const fn new(image: image::DynamicImage) -> Self {
        Self { image }
    }

    /// Decodes encoded image bytes (PNG, JPEG, WebP).
    ///
    /// # Errors
    /// Returns the decoder error if the bytes are not a supported image.
    pub fn decode(bytes: &[u8]) -> Result<Self, image::ImageError> {
        image::load_from_memory(bytes).map(Self::new)
    }

    /// Width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Borrows the underlying image.
    #[must_use]
    pub const fn image(&self) -> &image::DynamicImage {
        &self.image
    }
}

impl fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bitmap")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}
