//! Link previews from Open Graph, Twitter and product meta tags, plus the
//! image caches a UI needs to show them.

pub mod cache;
pub mod config;
pub mod id;
pub mod preview;
#[cfg(test)]
mod tests;

pub use config::Config;
pub use preview::{preview_from_html, FetchHandle, PreviewRecord, PreviewService, PreviewType};
