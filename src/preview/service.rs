use crate::config::FetchConfig;
use crate::preview::document::ParsedDocument;
use crate::preview::extract::extract_document;
use crate::preview::fetch::{HttpFetcher, PageFetcher};
use crate::preview::types::{FetchError, PreviewRecord};
use std::sync::Arc;
use tokio::task::JoinHandle;
use url::Url;

/// Parses already-fetched markup. `None` when the markup can't be parsed.
pub fn preview_from_html(html: &str, url: &Url) -> Option<PreviewRecord> {
    let document = ParsedDocument::parse(html)?;
    Some(extract_document(&document, url))
}

/// Fetch-then-parse front door. Cheap to clone; clones share the fetcher.
#[derive(Clone)]
pub struct PreviewService {
    fetcher: Arc<dyn PageFetcher>,
}

impl PreviewService {
    pub fn new(fetcher: Arc<dyn PageFetcher>) -> Self {
        Self { fetcher }
    }

    pub fn from_config(config: &FetchConfig) -> Result<Self, FetchError> {
        Ok(Self::new(Arc::new(HttpFetcher::new(config)?)))
    }

    /// Fetches `url` and extracts its preview. Every failure along the way
    /// (network, status, non UTF-8 body, empty document) is `None`.
    pub async fn fetch_metadata(&self, url: &Url) -> Option<PreviewRecord> {
        let bytes = match self.fetcher.fetch_page(url).await {
            Ok(b) => b,
            Err(err) => {
                log::warn!("{url}: fetch failed: {err}");
                return None;
            }
        };

        let html = match String::from_utf8(bytes) {
            Ok(h) => h,
            Err(err) => {
                log::debug!("{url}: {}", FetchError::from(err));
                return None;
            }
        };

        let preview = preview_from_html(&html, url);
        match preview {
            Some(ref p) if !p.has_any_data() => log::debug!("{url}: no preview metadata found"),
            Some(ref p) => log::info!("{url}: preview extracted type={}", p.content_type()),
            None => log::debug!("{url}: document could not be parsed"),
        }
        preview
    }

    /// Runs [`Self::fetch_metadata`] on the current tokio runtime and hands the
    /// result to `completion` exactly once, unless the handle is aborted first.
    /// The callback runs on a runtime worker; callers hop threads themselves.
    pub fn spawn_fetch<F>(&self, url: Url, completion: F) -> FetchHandle
    where
        F: FnOnce(Option<PreviewRecord>) + Send + 'static,
    {
        let service = self.clone();
        let task = tokio::spawn(async move {
            let preview = service.fetch_metadata(&url).await;
            completion(preview);
        });
        FetchHandle { task }
    }
}

/// Handle to an in-flight [`PreviewService::spawn_fetch`].
#[derive(Debug)]
pub struct FetchHandle {
    task: JoinHandle<()>,
}

impl FetchHandle {
    /// Drops the pending result; the completion will not run if it hasn't yet.
    pub fn abort(&self) {
        self.task.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Waits for the completion to have run. Returns false if the fetch was
    /// aborted or the completion panicked.
    pub async fn join(self) -> bool {
        self.task.await.is_ok()
    }
}
