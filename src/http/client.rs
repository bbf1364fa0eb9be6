//! HTTP fetcher with retry and rate limiting
//!
//! Provides a [`Fetcher`] over reqwest that handles:
//! - Joining resource paths onto a base URL
//! - Automatic retries with configurable backoff
//! - Rate limiting to prevent API throttling
//! - Status classification (anything but 2xx/302 is a transport failure)

use super::rate_limit::RateLimiter;
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::fetch::{Fetcher, RawResponse, RequestConfig};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;
use tracing::{debug, warn};

/// Default wait when a 429 carries no usable `Retry-After`
const DEFAULT_RETRY_AFTER_SECS: u64 = 1;

/// HTTP implementation of the fetch capability
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
    config: ClientConfig,
    rate_limiter: Option<RateLimiter>,
}

impl HttpFetcher {
    /// Create a fetcher with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Create a fetcher with custom configuration
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(&config.user_agent)
            .build()?;

        let rate_limiter = config
            .rate_limit
            .as_ref()
            .map(RateLimiter::new)
            .transpose()?;

        Ok(Self {
            client,
            config,
            rate_limiter,
        })
    }

    /// Configuration in use
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Check if rate limiting is enabled
    pub fn has_rate_limiter(&self) -> bool {
        self.rate_limiter.is_some()
    }

    /// Send one logical request, retrying transient failures
    pub async fn send(&self, path: &str, request: &RequestConfig) -> Result<Response> {
        let url = self.build_url(path)?;
        let method = reqwest::Method::from(request.method);
        let max_retries = self.config.retry.max_retries;

        let mut attempt = 0;
        loop {
            if let Some(ref limiter) = self.rate_limiter {
                limiter.wait().await;
            }

            let mut req = self.client.request(method.clone(), url.clone());
            for (key, value) in self.config.headers.iter().chain(&request.headers) {
                req = req.header(key.as_str(), value.as_str());
            }
            if !request.params.is_empty() {
                req = req.query(&request.params);
            }
            if let Some(ref body) = request.body {
                req = req.json(body);
            }

            let failure = match req.send().await {
                Ok(response) if is_success(response.status()) => {
                    debug!("{} {} -> {}", method, url, response.status().as_u16());
                    return Ok(response);
                }
                Ok(response) => {
                    let status = response.status();
                    let retry_after = (status == StatusCode::TOO_MANY_REQUESTS)
                        .then(|| extract_retry_after(&response));
                    let body = read_error_body(response).await;
                    let err = Error::http_status(status.as_u16(), body);
                    if !err.is_retryable() || attempt >= max_retries {
                        return Err(err);
                    }
                    (err, retry_after)
                }
                Err(e) if e.is_timeout() => {
                    let err = Error::Timeout {
                        timeout_ms: self.config.timeout_ms,
                    };
                    if attempt >= max_retries {
                        return Err(err);
                    }
                    (err, None)
                }
                Err(e) => {
                    if !e.is_connect() || attempt >= max_retries {
                        return Err(Error::Http(e));
                    }
                    (Error::Http(e), None)
                }
            };

            let (err, retry_after) = failure;
            let delay = retry_after
                .unwrap_or_else(|| self.config.retry.delay_for(attempt))
                .min(Duration::from_millis(self.config.retry.max_interval_ms));
            warn!(
                "Request to {} failed ({}), attempt {}/{}, retrying in {:?}",
                url,
                err,
                attempt + 1,
                max_retries + 1,
                delay
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    /// Build full URL from path
    fn build_url(&self, path: &str) -> Result<url::Url> {
        if path.starts_with("http://") || path.starts_with("https://") {
            return Ok(url::Url::parse(path)?);
        }

        match &self.config.base_url {
            Some(base) => {
                let base = base.trim_end_matches('/');
                let path = path.trim_start_matches('/');
                Ok(url::Url::parse(&format!("{base}/{path}"))?)
            }
            None => Err(Error::config(format!(
                "Cannot resolve relative path '{path}' without a base_url"
            ))),
        }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, path: &str, config: &RequestConfig) -> Result<RawResponse> {
        let response = self.send(path, config).await?;
        Ok(RawResponse::from_http(response))
    }
}

impl std::fmt::Debug for HttpFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpFetcher")
            .field("config", &self.config)
            .field("has_rate_limiter", &self.rate_limiter.is_some())
            .finish_non_exhaustive()
    }
}

/// Statuses the paged endpoints answer with on success
fn is_success(status: StatusCode) -> bool {
    status.is_success() || status == StatusCode::FOUND
}

/// Body of an error response; empty if it cannot be read
async fn read_error_body(response: Response) -> String {
    let status = response.status();
    let url = response.url().clone();
    match response.text().await {
        Ok(body) => body,
        Err(e) => {
            warn!(
                "Failed to read {} error body from {}: {}",
                status.as_u16(),
                url,
                e
            );
            String::new()
        }
    }
}

/// Extract retry-after header value
fn extract_retry_after(response: &Response) -> Duration {
    let secs = response
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
    Duration::from_secs(secs)
}
