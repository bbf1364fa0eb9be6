//! Client configuration
//!
//! Settings for the HTTP fetcher and the iterator defaults, loadable from a
//! YAML file. Every field has a default, so a config file only needs to name
//! what it changes:
//!
//! ```yaml
//! base_url: https://api.example.com
//! items_per_page: 50
//! retry:
//!   max_retries: 3
//! rate_limit:
//!   requests_per_second: 5
//! headers:
//!   X-Api-Version: "2"
//! ```

use crate::error::{Error, Result};
use crate::pagination::{PaginationState, DEFAULT_ITEMS_PER_PAGE};
use crate::types::{BackoffType, StringMap};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Configuration for a paged API client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL joined with every resource path
    pub base_url: Option<String>,
    /// Request timeout in milliseconds
    pub timeout_ms: u64,
    /// Page size iterators start with
    pub items_per_page: u32,
    /// Retry policy for transient failures
    pub retry: RetryConfig,
    /// Client-side rate limit; `None` disables it
    pub rate_limit: Option<RateLimitConfig>,
    /// Headers sent with every request
    pub headers: StringMap,
    /// User agent string
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_ms: 30_000,
            items_per_page: DEFAULT_ITEMS_PER_PAGE,
            retry: RetryConfig::default(),
            rate_limit: None,
            headers: StringMap::new(),
            user_agent: format!("pagewalk/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ClientConfig {
    /// Create the default config
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a YAML document
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!(
                "Failed to read config file '{}': {e}",
                path.display()
            ))
        })?;
        Self::from_yaml_str(&content)
    }

    /// Check values that would make the client unusable
    pub fn validate(&self) -> Result<()> {
        if self.timeout_ms == 0 {
            return Err(Error::invalid_value("timeout_ms", "must be greater than 0"));
        }
        if !PaginationState::is_valid_items_per_page(i64::from(self.items_per_page)) {
            return Err(Error::invalid_value(
                "items_per_page",
                format!("{} is outside 1..=500", self.items_per_page),
            ));
        }
        if let Some(base_url) = &self.base_url {
            url::Url::parse(base_url)?;
        }
        if self.retry.multiplier < 1.0 {
            return Err(Error::invalid_value(
                "retry.multiplier",
                "must be at least 1.0",
            ));
        }
        if let Some(rate_limit) = &self.rate_limit {
            if rate_limit.requests_per_second == 0 {
                return Err(Error::invalid_value(
                    "rate_limit.requests_per_second",
                    "must be greater than 0",
                ));
            }
        }
        Ok(())
    }

    /// Request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Set the base URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the request timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Set the starting page size
    #[must_use]
    pub fn with_items_per_page(mut self, items_per_page: u32) -> Self {
        self.items_per_page = items_per_page;
        self
    }

    /// Set the retry policy
    #[must_use]
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Set max retries, keeping the rest of the retry policy
    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.retry.max_retries = max_retries;
        self
    }

    /// Enable the client-side rate limit
    #[must_use]
    pub fn with_rate_limit(mut self, rate_limit: RateLimitConfig) -> Self {
        self.rate_limit = Some(rate_limit);
        self
    }

    /// Add a default header
    #[must_use]
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Set user agent
    #[must_use]
    pub fn with_user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }
}

/// Retry policy for transient transport failures (429, 5xx, timeouts)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Delay before the first retry, in milliseconds
    pub initial_interval_ms: u64,
    /// Upper bound on any single delay, in milliseconds
    pub max_interval_ms: u64,
    /// Growth factor for exponential backoff
    pub multiplier: f64,
    /// Backoff strategy
    pub backoff: BackoffType,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 5,
            initial_interval_ms: 100,
            max_interval_ms: 15_000,
            multiplier: 1.5,
            backoff: BackoffType::Exponential,
        }
    }
}

impl RetryConfig {
    /// Policy that never retries
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Default::default()
        }
    }

    /// Delay before retry number `attempt` (0-based)
    ///
    /// Computed in whole milliseconds with saturating arithmetic, then capped
    /// at `max_interval_ms`.
    #[allow(clippy::cast_precision_loss)]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let initial = self.initial_interval_ms;
        let millis = match self.backoff {
            BackoffType::Constant => initial,
            BackoffType::Linear => initial.saturating_mul(u64::from(attempt) + 1),
            BackoffType::Exponential => {
                let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
                let factor = self.multiplier.powi(exponent).min(1e6);
                // float-to-int casts saturate at u64::MAX
                (initial as f64 * factor) as u64
            }
        };
        Duration::from_millis(millis.min(self.max_interval_ms))
    }
}

/// Token bucket settings for the client-side rate limit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Sustained requests per second
    pub requests_per_second: u32,
    /// Requests allowed in a burst
    pub burst_size: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_second: 10,
            burst_size: 10,
        }
    }
}

impl RateLimitConfig {
    /// Create a rate limit config
    pub fn new(requests_per_second: u32, burst_size: u32) -> Self {
        Self {
            requests_per_second,
            burst_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_client_config_default() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, None);
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.items_per_page, 24);
        assert_eq!(config.retry.max_retries, 5);
        assert!(config.rate_limit.is_none());
        assert!(config.user_agent.starts_with("pagewalk/"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_client_config_from_yaml_fills_defaults() {
        let config = ClientConfig::from_yaml_str(
            r#"
base_url: https://api.example.com
items_per_page: 50
retry:
  max_retries: 2
rate_limit:
  requests_per_second: 5
headers:
  X-Api-Version: "2"
"#,
        )
        .unwrap();

        assert_eq!(config.base_url.as_deref(), Some("https://api.example.com"));
        assert_eq!(config.items_per_page, 50);
        assert_eq!(config.retry.max_retries, 2);
        assert_eq!(config.retry.initial_interval_ms, 100);
        assert_eq!(
            config.rate_limit,
            Some(RateLimitConfig {
                requests_per_second: 5,
                burst_size: 10
            })
        );
        assert_eq!(config.headers.get("X-Api-Version"), Some(&"2".to_string()));
        assert_eq!(config.timeout_ms, 30_000);
    }

    #[test]
    fn test_client_config_rejects_bad_values() {
        assert!(ClientConfig::from_yaml_str("items_per_page: 900").is_err());
        assert!(ClientConfig::from_yaml_str("timeout_ms: 0").is_err());
        assert!(ClientConfig::from_yaml_str("base_url: not a url").is_err());
        assert!(ClientConfig::from_yaml_str("rate_limit:\n  requests_per_second: 0").is_err());
        assert!(ClientConfig::from_yaml_str("retry: [1, 2]").is_err());
    }

    #[test]
    fn test_client_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "base_url: http://localhost:8080\ntimeout_ms: 500").unwrap();

        let config = ClientConfig::from_file(file.path()).unwrap();
        assert_eq!(config.base_url.as_deref(), Some("http://localhost:8080"));
        assert_eq!(config.timeout(), Duration::from_millis(500));
    }

    #[test]
    fn test_client_config_missing_file() {
        let err = ClientConfig::from_file("/definitely/not/here.yaml").unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_client_config_builder() {
        let config = ClientConfig::new()
            .with_base_url("https://api.example.com")
            .with_timeout(Duration::from_secs(5))
            .with_items_per_page(100)
            .with_max_retries(1)
            .with_rate_limit(RateLimitConfig::new(2, 4))
            .with_header("Accept", "application/json")
            .with_user_agent("test-agent/1.0");

        assert_eq!(config.timeout_ms, 5_000);
        assert_eq!(config.items_per_page, 100);
        assert_eq!(config.retry.max_retries, 1);
        assert_eq!(config.rate_limit, Some(RateLimitConfig::new(2, 4)));
        assert_eq!(config.user_agent, "test-agent/1.0");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_retry_delay_exponential() {
        let retry = RetryConfig::default();
        assert_eq!(retry.delay_for(0), Duration::from_millis(100));
        assert_eq!(retry.delay_for(1), Duration::from_millis(150));
        assert_eq!(retry.delay_for(2), Duration::from_millis(225));
        // Capped at the max interval
        assert_eq!(retry.delay_for(40), Duration::from_secs(15));
    }

    #[test]
    fn test_retry_delay_constant_and_linear() {
        let constant = RetryConfig {
            backoff: BackoffType::Constant,
            ..RetryConfig::default()
        };
        assert_eq!(constant.delay_for(3), Duration::from_millis(100));

        let linear = RetryConfig {
            backoff: BackoffType::Linear,
            ..RetryConfig::default()
        };
        assert_eq!(linear.delay_for(2), Duration::from_millis(300));
    }

    #[test]
    fn test_retry_delay_saturates_on_huge_intervals() {
        for backoff in [
            BackoffType::Constant,
            BackoffType::Linear,
            BackoffType::Exponential,
        ] {
            let retry = RetryConfig {
                initial_interval_ms: u64::MAX,
                max_interval_ms: u64::MAX,
                backoff,
                ..RetryConfig::default()
            };
            assert_eq!(retry.delay_for(u32::MAX), Duration::from_millis(u64::MAX));
        }

        let capped = RetryConfig {
            initial_interval_ms: u64::MAX / 2,
            backoff: BackoffType::Linear,
            ..RetryConfig::default()
        };
        assert_eq!(capped.delay_for(u32::MAX), Duration::from_secs(15));
    }
}
