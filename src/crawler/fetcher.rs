//! HTTP page fetcher
//!
//! The controller only sees the [`PageFetcher`] trait: give it a URL, get
//! back the page markup or a [`FetchError`]. [`HttpPageFetcher`] is the
//! reqwest-backed implementation used by the binary:
//! - builds the HTTP client with the configured user agent and timeout
//! - spaces requests through a [`RequestThrottle`]
//! - refuses URLs (and redirect targets) outside the allowed domain
//! - treats any non-2xx response as a failure; there are no retries

use crate::config::Config;
use crate::crawler::scheduler::RequestThrottle;
use crate::url::is_allowed_domain;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Errors raised while fetching a listing page
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("URL outside the allowed domain: {url}")]
    Offsite { url: String },

    #[error("Fetch of {url} did not complete: {message}")]
    Task { url: String, message: String },
}

/// Markup of one fetched page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub url: String,

    /// HTTP status code
    pub status_code: u16,

    /// Page body content
    pub body: String,
}

/// Source of listing page markup
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError>;
}

/// Builds an HTTP client with the given user agent and timeout
pub fn build_http_client(user_agent: &str, timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// reqwest-backed page fetcher
pub struct HttpPageFetcher {
    client: Client,
    throttle: RequestThrottle,
    allowed_domain: Option<String>,
}

impl HttpPageFetcher {
    pub fn new(client: Client, throttle: RequestThrottle, allowed_domain: Option<String>) -> Self {
        Self {
            client,
            throttle,
            allowed_domain,
        }
    }

    /// Builds a fetcher from the crawler and user agent settings
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        let client = build_http_client(
            &config.user_agent.agent,
            Duration::from_secs(config.crawler.request_timeout),
        )?;
        let throttle = RequestThrottle::new(
            config.crawler.concurrency as usize,
            Duration::from_millis(config.crawler.request_delay),
        );
        Ok(Self::new(
            client,
            throttle,
            config.crawler.allowed_domain.clone(),
        ))
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        if !is_allowed_domain(url, self.allowed_domain.as_deref()) {
            return Err(FetchError::Offsite {
                url: url.to_string(),
            });
        }

        let _permit = self.throttle.acquire().await.map_err(|e| FetchError::Task {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        tracing::debug!(
            "GET {} ({} request slots free)",
            url,
            self.throttle.available_permits()
        );

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| classify_error(url, e))?;

        let status = response.status();
        let final_url = response.url().clone();

        if !is_allowed_domain(&final_url, self.allowed_domain.as_deref()) {
            return Err(FetchError::Offsite {
                url: final_url.to_string(),
            });
        }

        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|e| classify_error(url, e))?;

        Ok(FetchedPage {
            url: final_url.to_string(),
            status_code: status.as_u16(),
            body,
        })
    }
}

fn classify_error(url: &Url, err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else {
        FetchError::Http {
            url: url.to_string(),
            source: err,
        }
    }
}
