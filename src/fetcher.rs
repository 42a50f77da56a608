//! HTTP access to the publishing platform.
//!
//! The walker never talks to `reqwest` directly. It goes through the
//! [`FeedSource`] trait so that walks can be driven by canned responses in
//! tests, and [`HttpFeedSource`] is the production implementation.
//!
//! # Endpoints
//!
//! | Method | Path | Body |
//! |--------|------|------|
//! | [`FeedSource::user_rss`] | `/u/{user}/rss` | RSS 2.0 document |
//! | [`FeedSource::user_bitfeed`] | `/u/{user}/bitfeed[?page=N]` | `{"tx": [{"id", "timestamp"}]}` |
//! | [`FeedSource::transaction_page`] | `/tx/{id}` | HTML page of one post |
//!
//! Requests are issued one at a time and are never retried.

use crate::error::FetchError;
use crate::models::BitFeed;
use crate::utils::truncate_for_log;
use reqwest::Client;
use std::time::Instant;
use tracing::{debug, instrument, warn};
use url::Url;

/// Source of raw feed data for one platform.
pub trait FeedSource {
    /// Location of `user`'s RSS document, for error reports.
    fn rss_url(&self, user: &str) -> String;

    /// Fetch the RSS document for `user`.
    async fn user_rss(&self, user: &str) -> Result<String, FetchError>;

    /// Fetch one page (1-based) of the JSON listing for `user`.
    async fn user_bitfeed(&self, user: &str, page: u32) -> Result<BitFeed, FetchError>;

    /// Fetch the HTML page of the post with transaction id `id`.
    async fn transaction_page(&self, id: &str) -> Result<String, FetchError>;
}

/// [`FeedSource`] backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpFeedSource {
    client: Client,
    base_url: Url,
}

impl HttpFeedSource {
    pub fn new(base_url: Url) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, mut base_url: Url) -> Self {
        // `Url::join` replaces the last path segment unless the base ends in '/'.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, FetchError> {
        let relative = segments
            .iter()
            .map(|s| urlencoding::encode(s).into_owned())
            .collect::<Vec<_>>()
            .join("/");
        self.base_url
            .join(&relative)
            .map_err(|source| FetchError::Url {
                segment: relative,
                source,
            })
    }

    #[instrument(level = "debug", skip_all, fields(%url))]
    async fn get_text(&self, url: Url) -> Result<String, FetchError> {
        let t0 = Instant::now();
        let url_str = url.to_string();
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Http {
                url: url_str.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), url = %url_str, "Unexpected HTTP status");
            return Err(FetchError::UnexpectedStatus {
                status: status.as_u16(),
                url: url_str,
            });
        }

        let body = response.text().await.map_err(|source| FetchError::Http {
            url: url_str.clone(),
            source,
        })?;
        debug!(
            bytes = body.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Fetched body"
        );
        Ok(body)
    }
}

impl FeedSource for HttpFeedSource {
    fn rss_url(&self, user: &str) -> String {
        match self.endpoint(&["u", user, "rss"]) {
            Ok(url) => url.to_string(),
            Err(_) => format!("{}u/{user}/rss", self.base_url),
        }
    }

    #[instrument(level = "info", skip(self))]
    async fn user_rss(&self, user: &str) -> Result<String, FetchError> {
        let url = self.endpoint(&["u", user, "rss"])?;
        self.get_text(url).await
    }

    #[instrument(level = "info", skip(self))]
    async fn user_bitfeed(&self, user: &str, page: u32) -> Result<BitFeed, FetchError> {
        let mut url = self.endpoint(&["u", user, "bitfeed"])?;
        if page > 1 {
            url.query_pairs_mut().append_pair("page", &page.to_string());
        }
        let url_str = url.to_string();
        let body = self.get_text(url).await?;

        serde_json::from_str(&body).map_err(|source| FetchError::Decode {
            url: url_str,
            preview: truncate_for_log(&body, 200),
            source,
        })
    }

    #[instrument(level = "debug", skip(self))]
    async fn transaction_page(&self, id: &str) -> Result<String, FetchError> {
        let url = self.endpoint(&["tx", id])?;
        self.get_text(url).await
    }
}
