use crate::cache::MemoryStorage;
use crate::config::PlaceholderConfig;
use image::RgbaImage;
use std::num::NonZeroUsize;
use std::sync::Arc;

/// Size placeholders are decoded at before being stretched by the UI.
pub const PLACEHOLDER_SIZE: (u32, u32) = (5, 5);

/// Turns a compact placeholder hash into pixels.
pub trait PlaceholderDecoder: Send + Sync {
    fn decode(&self, hash: &str, width: u32, height: u32) -> Option<RgbaImage>;
}

impl<F> PlaceholderDecoder for F
where
    F: Fn(&str, u32, u32) -> Option<RgbaImage> + Send + Sync,
{
    fn decode(&self, hash: &str, width: u32, height: u32) -> Option<RgbaImage> {
        self(hash, width, height)
    }
}

/// Memory-only cache of decoded placeholders keyed by their hash string.
pub struct PlaceholderCache {
    images: MemoryStorage<Arc<RgbaImage>>,
    decoder: Arc<dyn PlaceholderDecoder>,
}

impl PlaceholderCache {
    pub fn new(config: &PlaceholderConfig, decoder: Arc<dyn PlaceholderDecoder>) -> Self {
        let count_limit = NonZeroUsize::new(config.count_limit).unwrap_or(NonZeroUsize::MIN);
        Self {
            images: MemoryStorage::new(count_limit, config.cost_limit, None),
            decoder,
        }
    }

    pub fn get(&self, hash: &str) -> Option<Arc<RgbaImage>> {
        self.images.get(hash)
    }

    /// Cached placeholder for `hash`, decoding it on a miss. `None` means the
    /// hash could not be decoded and the caller should use its own default.
    /// Decoding is CPU work; async callers should run this on a blocking pool.
    pub fn get_or_decode(&self, hash: &str) -> Option<Arc<RgbaImage>> {
        if let Some(image) = self.images.get(hash) {
            return Some(image);
        }

        let (width, height) = PLACEHOLDER_SIZE;
        let Some(image) = self.decoder.decode(hash, width, height) else {
            log::debug!("placeholder hash {hash:?} did not decode");
            return None;
        };

        let image = Arc::new(image);
        self.images.insert(hash, image.clone());
        Some(image)
    }

    pub fn clear(&self) {
        self.images.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_decodes_once_per_hash() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let decoder = move |_: &str, w: u32, h: u32| {
            counter.fetch_add(1, Ordering::SeqCst);
            Some(RgbaImage::new(w, h))
        };
        let cache = PlaceholderCache::new(&PlaceholderConfig::default(), Arc::new(decoder));

        let first = cache.get_or_decode("LEHV6nWB2yk8pyo0adR*.7kCMdnj").unwrap();
        let second = cache.get_or_decode("LEHV6nWB2yk8pyo0adR*.7kCMdnj").unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.dimensions(), PLACEHOLDER_SIZE);
    }

    #[test]
    fn test_failed_decode_not_cached() {
        let decoder = |_: &str, _: u32, _: u32| -> Option<RgbaImage> { None };
        let cache = PlaceholderCache::new(&PlaceholderConfig::default(), Arc::new(decoder));

        assert!(cache.get_or_decode("bad").is_none());
        assert!(cache.get("bad").is_none());
    }

    #[test]
    fn test_cost_limit_applies_to_pixels() {
        let config = PlaceholderConfig {
            count_limit: 10,
            cost_limit: 5 * 5 * 4,
        };
        let decoder = |_: &str, w: u32, h: u32| Some(RgbaImage::new(w, h));
        let cache = PlaceholderCache::new(&config, Arc::new(decoder));

        cache.get_or_decode("a").unwrap();
        cache.get_or_decode("b").unwrap();

        assert!(cache.get("a").is_none());
        assert!(cache.get("b").is_some());
    }
}
