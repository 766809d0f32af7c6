//! Image caching services.
//!
//! Nothing in here is global: callers build an [`ImageCache`],
//! [`PlaceholderCache`] or [`ThumbnailStore`] once and share it by `Arc`.

pub mod disk;
pub mod image;
pub mod image_validation;
pub mod memory;
pub mod placeholder;
pub mod thumbnail;

pub use self::image::{ImageCache, ImageLoader};
pub use disk::DiskStorage;
pub use memory::MemoryStorage;
pub use placeholder::{PlaceholderCache, PlaceholderDecoder};
pub use thumbnail::{FrameGrabber, ThumbnailStore};

use ::image::RgbaImage;
use std::sync::Arc;

#[derive(thiserror::Error, Debug)]
pub enum CacheError {
    #[error("io error: {0:?}")]
    IO(#[from] std::io::Error),

    #[error("thumbnail generation failed: {0}")]
    Thumbnail(String),

    #[error("worker task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Weight of a cached value against a memory cost limit.
pub trait CacheCost {
    fn cost(&self) -> u64;
}

impl CacheCost for Arc<Vec<u8>> {
    fn cost(&self) -> u64 {
        self.len() as u64
    }
}

/// Decoded RGBA pixels, four bytes each.
impl CacheCost for Arc<RgbaImage> {
    fn cost(&self) -> u64 {
        u64::from(self.width()) * u64::from(self.height()) * 4
    }
}
