//! Page download over HTTP with bounded retries.

use std::time::{Duration, Instant};

use rac_types::parse_source_url;
pub use rac_types::netloc;
use reqwest::{Client, StatusCode, Url};

use crate::config::CaptureConfig;
use crate::error::FetchError;

/// Downloads article pages.
pub struct PageFetcher {
    client: Client,
    max_retries: u32,
    retry_backoff: Duration,
}

impl PageFetcher {
    /// Create a fetcher.
    ///
    /// `max_retries` extra attempts are made after a retryable failure;
    /// attempt `n` waits `n * retry_backoff` first.
    #[must_use]
    pub fn new(
        timeout: Duration,
        user_agent: &str,
        max_retries: u32,
        retry_backoff: Duration,
    ) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .unwrap_or_default();
        Self {
            client,
            max_retries,
            retry_backoff,
        }
    }

    /// Create a fetcher from resolved config.
    #[must_use]
    pub fn from_config(config: &CaptureConfig) -> Self {
        Self::new(
            config.request_timeout,
            &config.user_agent,
            config.max_retries,
            config.retry_backoff,
        )
    }

    /// Fetch `url` and return the response body.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::InvalidUrl`] for non-http(s) URLs, otherwise the
    /// last failure once retries are exhausted or a non-retryable status
    /// is seen.
    pub async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let parsed = parse_page_url(url)?;
        let mut attempt: u32 = 0;
        loop {
            let started = Instant::now();
            match self.fetch_once(&parsed, url).await {
                Ok(body) => {
                    tracing::debug!(
                        event = "capture.fetch.completed",
                        url,
                        attempt,
                        bytes = body.len(),
                        elapsed_ms = started.elapsed().as_millis(),
                        "page fetched"
                    );
                    return Ok(body);
                }
                Err(error) if error.is_retryable() && attempt < self.max_retries => {
                    attempt += 1;
                    let wait = self.retry_backoff * attempt;
                    tracing::warn!(
                        event = "capture.fetch.retry",
                        url,
                        attempt,
                        max_retries = self.max_retries,
                        wait_ms = wait.as_millis(),
                        error = %error,
                        "page fetch failed; retrying"
                    );
                    tokio::time::sleep(wait).await;
                }
                Err(error) => return Err(error),
            }
        }
    }

    async fn fetch_once(&self, parsed: &Url, url: &str) -> Result<String, FetchError> {
        let transport = |source| FetchError::Transport {
            url: url.to_string(),
            source,
        };
        let response = self
            .client
            .get(parsed.clone())
            .send()
            .await
            .map_err(transport)?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        response.text().await.map_err(transport)
    }
}

/// Parse a page URL, accepting only http and https.
///
/// # Errors
///
/// Returns [`FetchError::InvalidUrl`] otherwise.
pub fn parse_page_url(url: &str) -> Result<Url, FetchError> {
    parse_source_url(url).ok_or_else(|| FetchError::InvalidUrl(url.to_string()))
}
