//! HTTP page fetcher with rate limiting and forced UTF-8 decoding
//!
//! The source pages mis-declare their charset, so the body is always decoded
//! as UTF-8 regardless of the `Content-Type` header or any `<meta charset>`.
//! Invalid sequences become U+FFFD instead of failing the page.
//!
//! The fetcher never retries; see [`crate::utils::retry`] for the driver's
//! opt-in detail-page retry.

use crate::config::CrawlerConfig;
use crate::utils::error::FetchError;
use encoding_rs::UTF_8;
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE},
    Client,
};
use std::num::NonZeroU32;
use std::time::Duration;

/// Page fetcher shared by listing and detail retrieval
pub struct PageFetcher {
    /// HTTP client with configured timeout, user agent and compression
    client: Client,

    /// Rate limiter to control request frequency
    rate_limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
}

impl PageFetcher {
    /// Create a fetcher from crawler settings
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Http` if the HTTP client cannot be created
    pub fn new(config: &CrawlerConfig) -> Result<Self, FetchError> {
        Self::with_settings(
            config.rate_limit,
            Duration::from_secs(config.request_timeout_secs),
            &config.user_agent,
        )
    }

    /// Create a fetcher with explicit settings
    ///
    /// `requests_per_second` may be fractional (`0.5` = one request every two
    /// seconds); non-positive values fall back to one request per second.
    pub fn with_settings(
        requests_per_second: f64,
        timeout: Duration,
        user_agent: &str,
    ) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .default_headers(default_headers())
            .gzip(true)
            .build()?;

        Ok(Self {
            client,
            rate_limiter: RateLimiter::direct(quota_for(requests_per_second)),
        })
    }

    /// GET `url` and return its body decoded as UTF-8
    ///
    /// # Errors
    ///
    /// - `FetchError::InvalidUrl` if `url` does not parse
    /// - `FetchError::Timeout` if the request exceeds the configured timeout
    /// - `FetchError::Status` for any non-2xx response
    /// - `FetchError::Http` for connection and body-read failures
    pub async fn fetch_text(&self, url: &str) -> Result<String, FetchError> {
        let parsed = reqwest::Url::parse(url)
            .map_err(|e| FetchError::InvalidUrl(format!("{url}: {e}")))?;

        self.rate_limiter.until_ready().await;
        tracing::debug!(url, "Fetching page");

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| classify(e, url))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let bytes = response.bytes().await.map_err(|e| classify(e, url))?;
        Ok(decode_utf8(&bytes))
    }
}

/// Decode bytes as UTF-8, replacing malformed sequences
///
/// A leading BOM is dropped. The declared charset is deliberately ignored.
pub fn decode_utf8(bytes: &[u8]) -> String {
    let (text, had_errors) = UTF_8.decode_with_bom_removal(bytes);
    if had_errors {
        tracing::debug!("Response body contained invalid UTF-8 sequences");
    }
    text.into_owned()
}

fn classify(error: reqwest::Error, url: &str) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout(url.to_string())
    } else {
        FetchError::Http(error)
    }
}

fn quota_for(requests_per_second: f64) -> Quota {
    if requests_per_second >= 1.0 {
        let rate = NonZeroU32::new(requests_per_second.min(f64::from(u32::MAX)) as u32)
            .unwrap_or(NonZeroU32::MIN);
        return Quota::per_second(rate);
    }
    if requests_per_second > 0.0 {
        if let Some(quota) = Quota::with_period(Duration::from_secs_f64(1.0 / requests_per_second))
        {
            return quota;
        }
    }
    Quota::per_second(NonZeroU32::MIN)
}

fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"),
    );
    headers.insert(
        ACCEPT_LANGUAGE,
        HeaderValue::from_static("zh-TW,zh;q=0.9,en-US;q=0.8,en;q=0.7"),
    );
    headers
}
