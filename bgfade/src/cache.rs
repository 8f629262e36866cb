// ABOUTME: In-memory cache of image sources that already finished loading
// ABOUTME: Lets hosts skip lazy-loading and fade-in for images seen earlier in the process

use crate::descriptor::DescriptorSet;
use once_cell::sync::Lazy;
use std::collections::HashSet;
use std::sync::Mutex;

static SHARED_CACHE: Lazy<Mutex<ImageCache>> = Lazy::new(|| Mutex::new(ImageCache::new()));

/// Process-wide cache instance for hosts that keep a single store per process.
pub fn shared_cache() -> &'static Mutex<ImageCache> {
    &SHARED_CACHE
}

#[derive(Debug, Clone, Default)]
pub struct ImageCache {
    seen: HashSet<String>,
}

impl ImageCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when the image (or every layer of a stack) has been seen loaded.
    pub fn is_cached(&self, images: &DescriptorSet) -> bool {
        match images {
            DescriptorSet::Single(descriptor) => self.contains(&descriptor.src),
            DescriptorSet::Layered(layers) => layers
                .iter()
                .all(|layer| layer.src().is_some_and(|src| self.contains(src))),
        }
    }

    pub fn is_cached_opt(&self, images: Option<&DescriptorSet>) -> bool {
        images.is_some_and(|images| self.is_cached(images))
    }

    pub fn mark_cached(&mut self, images: &DescriptorSet) {
        match images {
            DescriptorSet::Single(descriptor) => self.insert(&descriptor.src),
            DescriptorSet::Layered(layers) => {
                for src in layers.iter().filter_map(|layer| layer.src()) {
                    self.insert(src);
                }
            }
        }
    }

    pub fn mark_cached_opt(&mut self, images: Option<&DescriptorSet>) {
        if let Some(images) = images {
            self.mark_cached(images);
        }
    }

    pub fn reset(&mut self) {
        log::debug!("Resetting image cache ({} entries)", self.seen.len());
        self.seen.clear();
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    fn contains(&self, src: &str) -> bool {
        let hit = !src.is_empty() && self.seen.contains(src);
        log::trace!("Cache {}: {}", if hit { "hit" } else { "miss" }, src);
        hit
    }

    fn insert(&mut self, src: &str) {
        if src.is_empty() {
            return;
        }
        if self.seen.insert(src.to_string()) {
            log::debug!("Cached image: {}", src);
        }
    }
}
