use crate::cache::image_validation::validate_image;
use crate::cache::{CacheError, DiskStorage, MemoryStorage};
use crate::config::Config;
use crate::preview::PageFetcher;
use std::num::NonZeroUsize;
use std::sync::Arc;
use url::Url;

/// Two-tier image cache: a bounded LRU in memory over a directory on disk.
pub struct ImageCache {
    memory: MemoryStorage<Arc<Vec<u8>>>,
    disk: DiskStorage,
}

impl ImageCache {
    pub fn new(memory: MemoryStorage<Arc<Vec<u8>>>, disk: DiskStorage) -> Self {
        Self { memory, disk }
    }

    pub fn from_config(config: &Config) -> Result<Self, CacheError> {
        let limits = &config.cache;
        let count_limit = NonZeroUsize::new(limits.memory_count_limit).unwrap_or(NonZeroUsize::MIN);
        let memory = MemoryStorage::new(
            count_limit,
            limits.memory_cost_limit,
            Some(limits.memory_expiration()),
        );
        let disk = DiskStorage::new(
            config.cache_dir(),
            limits.disk_size_limit,
            limits.disk_expiration(),
        )?;
        Ok(Self::new(memory, disk))
    }

    /// Writes to disk first, then memory.
    pub fn store(&self, key: &str, data: Arc<Vec<u8>>) -> Result<(), CacheError> {
        self.disk.store(key, &data)?;
        self.memory.insert(key, data);
        Ok(())
    }

    /// Memory first, then disk. Disk hits are promoted into memory.
    pub fn retrieve(&self, key: &str) -> Option<Arc<Vec<u8>>> {
        if let Some(data) = self.memory.get(key) {
            return Some(data);
        }

        match self.disk.retrieve(key) {
            Ok(Some(data)) => {
                log::debug!("{key}: disk hit");
                let data = Arc::new(data);
                self.memory.insert(key, data.clone());
                Some(data)
            }
            Ok(None) => None,
            Err(err) => {
                log::warn!("{key}: disk cache read failed: {err}");
                None
            }
        }
    }

    pub fn is_cached_in_memory(&self, key: &str) -> bool {
        self.memory.get(key).is_some()
    }

    pub fn clear_all(&self) -> Result<(), CacheError> {
        self.memory.clear();
        self.disk.clear()?;
        log::info!("image cache cleared");
        Ok(())
    }

    pub fn clear_expired(&self) -> Result<(), CacheError> {
        let in_memory = self.memory.remove_expired();
        let on_disk = self.disk.remove_expired()?;
        log::info!("expired entries removed: memory={in_memory} disk={on_disk}");
        Ok(())
    }

    /// Bytes currently held on disk.
    pub fn disk_size(&self) -> u64 {
        self.disk.total_size()
    }
}

/// Retrieve-or-download front for [`ImageCache`].
#[derive(Clone)]
pub struct ImageLoader {
    cache: Arc<ImageCache>,
    fetcher: Arc<dyn PageFetcher>,
}

impl ImageLoader {
    pub fn new(cache: Arc<ImageCache>, fetcher: Arc<dyn PageFetcher>) -> Self {
        Self { cache, fetcher }
    }

    pub fn cache(&self) -> &ImageCache {
        &self.cache
    }

    /// Cached bytes for `url`, downloading them on a miss. Bytes that don't
    /// look like an image are returned as `None` and never cached.
    pub async fn load(&self, url: &Url) -> Option<Arc<Vec<u8>>> {
        let key = url.as_str();
        if let Some(data) = self.cache.retrieve(key) {
            return Some(data);
        }

        let bytes = match self.fetcher.fetch_page(url).await {
            Ok(b) => b,
            Err(err) => {
                log::warn!("{url}: image download failed: {err}");
                return None;
            }
        };

        if !validate_image(&bytes) {
            log::debug!("{url}: response is not an image, skipping cache");
            return None;
        }

        let data = Arc::new(bytes);
        if let Err(err) = self.cache.store(key, data.clone()) {
            log::warn!("{url}: image cache write failed: {err}");
        }
        Some(data)
    }
}
