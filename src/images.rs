//! Image cache
//!
//! Images are requested once, keyed by URL, and never evicted. The frame
//! painter polls `ready` every frame instead of waiting for a load.

use std::collections::HashMap;

/// A loaded or loading image
pub trait ImageHandle {
    /// Decoded and drawable
    fn is_ready(&self) -> bool;
}

/// Append-only map from URL to image handle
#[derive(Debug)]
pub struct ImageCache<I> {
    images: HashMap<String, I>,
}

impl<I> Default for ImageCache<I> {
    fn default() -> Self {
        Self {
            images: HashMap::new(),
        }
    }
}

impl<I: ImageHandle> ImageCache<I> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start loading `url` with `load` unless it was requested before
    pub fn request(&mut self, url: &str, load: impl FnOnce(&str) -> Option<I>) {
        if self.images.contains_key(url) {
            return;
        }
        match load(url) {
            Some(image) => {
                log::debug!("Requested image {url}");
                self.images.insert(url.to_string(), image);
            }
            None => log::warn!("Could not create image for {url}"),
        }
    }

    /// The image for `url` if it is ready to draw
    pub fn ready(&self, url: &str) -> Option<&I> {
        self.images.get(url).filter(|image| image.is_ready())
    }

    pub fn contains(&self, url: &str) -> bool {
        self.images.contains_key(url)
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}
