pub mod document;
pub mod extract;
pub mod fetch;
pub mod service;
pub mod types;

pub use document::{ParsedDocument, Tag, TagAttrs};
pub use extract::{extract, extract_document};
pub use fetch::{HttpFetcher, PageFetcher};
pub use service::{preview_from_html, FetchHandle, PreviewService};
pub use types::{FetchError, PreviewFields, PreviewRecord, PreviewType};
