use crate::config::FetchConfig;
use crate::preview::types::FetchError;
use async_trait::async_trait;
use std::error::Error;
use url::Url;

/// Anything that can hand back the raw body behind a URL.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_page(&self, url: &Url) -> Result<Vec<u8>, FetchError>;
}

/// Single-shot GET over a shared `reqwest` client. No retries.
///
/// Bodies are returned whatever the status, since error pages often still
/// carry preview tags. [`HttpFetcher::with_status_check`] turns non-success
/// statuses into [`FetchError::Status`] instead.
#[derive(Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    status_check: bool,
}

impl HttpFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout())
            .build()?;
        Ok(Self {
            client,
            status_check: false,
        })
    }

    pub fn with_status_check(mut self) -> Self {
        self.status_check = true;
        self
    }
}

fn get_error(error: &reqwest::Error) -> String {
    match error.source() {
        Some(e) => match e.source() {
            Some(e) => e.to_string(),
            None => e.to_string(),
        },
        None => error.to_string(),
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch_page(&self, url: &Url) -> Result<Vec<u8>, FetchError> {
        let iden = format!("{}{}", url.host_str().unwrap_or_default(), url.path());
        log::debug!("{iden}: requesting");

        let resp = self.client.get(url.clone()).send().await.map_err(|err| {
            log::warn!("{iden}: {}", get_error(&err));
            err
        })?;

        let status = resp.status();
        if !status.is_success() {
            log::debug!("{iden}: {status}");
            if self.status_check {
                return Err(FetchError::Status(status));
            }
        }

        let bytes = resp.bytes().await?;
        log::debug!("{iden}: received {} bytes", bytes.len());
        Ok(bytes.into())
    }
}
