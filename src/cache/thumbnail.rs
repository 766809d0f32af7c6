use crate::cache::{CacheError, MemoryStorage};
use crate::config::ThumbnailConfig;
use image::RgbaImage;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Point in the video the thumbnail is taken from.
pub const CAPTURE_AT: Duration = Duration::from_secs(1);

/// Pulls a single frame out of a video. Implementations block.
pub trait FrameGrabber: Send + Sync {
    fn grab_frame(&self, url: &Url, at: Duration) -> Result<RgbaImage, CacheError>;
}

/// Memo of generated video thumbnails keyed by the video URL, bounded by
/// count and decoded pixel bytes.
pub struct ThumbnailStore {
    grabber: Arc<dyn FrameGrabber>,
    assets: MemoryStorage<Arc<RgbaImage>>,
}

impl ThumbnailStore {
    pub fn new(config: &ThumbnailConfig, grabber: Arc<dyn FrameGrabber>) -> Self {
        let count_limit = NonZeroUsize::new(config.count_limit).unwrap_or(NonZeroUsize::MIN);
        Self {
            grabber,
            assets: MemoryStorage::new(count_limit, config.cost_limit, None),
        }
    }

    /// Thumbnail already generated for `url`, if any. Never generates.
    pub fn local(&self, url: &Url) -> Option<Arc<RgbaImage>> {
        self.assets.get(url.as_str())
    }

    /// Returns the memoized thumbnail or grabs one on the blocking pool.
    pub async fn fetch(&self, url: &Url) -> Option<Arc<RgbaImage>> {
        if let Some(image) = self.local(url) {
            return Some(image);
        }

        let grabber = self.grabber.clone();
        let video = url.clone();
        let grabbed = tokio::task::spawn_blocking(move || grabber.grab_frame(&video, CAPTURE_AT))
            .await
            .map_err(CacheError::from)
            .and_then(|r| r);

        match grabbed {
            Ok(image) => {
                let image = Arc::new(image);
                self.assets.insert(url.as_str(), image.clone());
                Some(image)
            }
            Err(err) => {
                log::debug!("{url}: {err}");
                None
            }
        }
    }

    pub fn clear(&self) {
        self.assets.clear();
    }
}
