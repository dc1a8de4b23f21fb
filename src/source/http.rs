//! HTTP page source.
//!
//! Fetches pages from a JSONPlaceholder-style endpoint:
//!
//! ```text
//! GET {base_url}/posts?_limit={page_size}&_page={page}
//! ```
//!
//! The response body must be a JSON array of [`Post`] objects; an empty array
//! means the feed is exhausted.

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use reqwest::Url;

use super::{PageSource, Post};
use crate::error::{FailureKind, FetchError};

/// Transport settings for [`HttpPageSource`].
#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub page_size: u32,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            page_size: 10,
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(10),
        }
    }
}

/// A page source backed by a REST endpoint.
pub struct HttpPageSource {
    base_url: String,
    settings: HttpSettings,
    client: reqwest::Client,
}

impl HttpPageSource {
    /// Create a new source.
    ///
    /// # Arguments
    ///
    /// * `base_url` — endpoint root, e.g. `https://jsonplaceholder.typicode.com`.
    ///   A trailing slash is tolerated.
    /// * `settings` — page size and timeouts.
    pub fn new(base_url: impl Into<String>, settings: HttpSettings) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| FetchError::new(FailureKind::Network, err.to_string()))?;

        Ok(Self {
            base_url: base_url.into(),
            settings,
            client,
        })
    }

    /// Build the request URL for `page`.
    pub fn page_url(&self, page: u32) -> Result<Url, FetchError> {
        let raw = format!("{}/posts", self.base_url.trim_end_matches('/'));
        let mut url = Url::parse(&raw)
            .map_err(|err| FetchError::new(FailureKind::InvalidUrl, format!("{raw}: {err}")))?;
        url.query_pairs_mut()
            .append_pair("_limit", &self.settings.page_size.to_string())
            .append_pair("_page", &page.to_string());
        Ok(url)
    }
}

#[async_trait]
impl PageSource for HttpPageSource {
    fn name(&self) -> &str {
        &self.base_url
    }

    async fn fetch_page(&self, page: u32) -> Result<Vec<Post>, FetchError> {
        let url = self.page_url(page)?;
        debug!("GET {url}");

        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        let body = response.bytes().await?;
        let posts: Vec<Post> = serde_json::from_slice(&body)?;
        Ok(posts)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
