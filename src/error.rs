//! Error types for pagewalk
//!
//! This module defines the error hierarchy for the entire crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use thiserror::Error;

/// The main error type for pagewalk
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    /// Unusable configuration (missing file, relative path without base URL)
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// A configuration field holds a value outside its accepted range
    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue {
        /// Dotted field name, e.g. `retry.multiplier`
        field: String,
        /// Why the value was rejected
        message: String,
    },

    /// Malformed YAML configuration
    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// Malformed JSON
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Transport Errors
    // ============================================================================
    /// The HTTP client failed before a status was received
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status
    #[error("HTTP {status}: {body}")]
    HttpStatus {
        /// Response status code
        status: u16,
        /// Response body, possibly empty
        body: String,
    },

    /// The request did not complete in time
    #[error("Request timeout after {timeout_ms}ms")]
    Timeout {
        /// Configured timeout
        timeout_ms: u64,
    },

    /// A base URL or request path could not be parsed
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A custom fetcher rejected the request
    #[error("Transport error: {message}")]
    Transport {
        /// Failure description
        message: String,
    },

    // ============================================================================
    // Decode Errors
    // ============================================================================
    /// The response could not be turned into an envelope or into records
    #[error("Failed to decode response: {message}")]
    Decode {
        /// Failure description
        message: String,
    },

    // ============================================================================
    // Iteration Errors
    // ============================================================================
    /// A fetch failure captured by a page iterator
    #[error(transparent)]
    Fetch(#[from] FetchFailure),

    /// The cursor points outside the cached page
    #[error("Index {index} is out of range for a page of {len} items")]
    IndexOutOfRange {
        /// Local index (`cursor - offset`), negative when the cursor precedes the page
        index: i64,
        /// Number of cached records
        len: usize,
    },

    /// Page navigation was attempted on a single-record resource
    #[error("Page navigation is unavailable: the resource returned a single record")]
    SingleItemMode,
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an invalid config value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an HTTP status error
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    /// Create a transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Http(_) | Error::Timeout { .. } => true,
            Error::HttpStatus { status, .. } => is_retryable_status(*status),
            _ => false,
        }
    }

    /// Check if this is a captured fetch failure
    pub fn is_fetch_failure(&self) -> bool {
        matches!(self, Self::Fetch(_))
    }

    /// Server-supplied `message` carried in an HTTP error body, if any
    pub fn server_message(&self) -> Option<String> {
        match self {
            Error::HttpStatus { body, .. } => serde_json::from_str::<serde_json::Value>(body)
                .ok()
                .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from))
                .filter(|m| !m.is_empty()),
            Error::Fetch(failure) => failure.server_message().map(String::from),
            _ => None,
        }
    }
}

/// Check if an HTTP status code is retryable
fn is_retryable_status(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504)
}

/// A failed fetch as captured by a page iterator.
///
/// Unlike [`Error`] this is `Clone`, so the iterator can hand one copy to the
/// caller and keep another readable through `err()`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchFailure {
    /// The fetch capability failed or rejected the request
    #[error("Transport error: {message}")]
    Transport {
        /// Display text of the underlying failure
        message: String,
        /// HTTP status, when the transport reported one
        status: Option<u16>,
        /// `message` from the server's error body, if present
        server_message: Option<String>,
    },

    /// The response could not be normalized into an envelope
    #[error("Decode error: {message}")]
    Decode {
        /// Display text of the underlying failure
        message: String,
    },
}

impl FetchFailure {
    /// Text to expose through the iterator's `message()` accessor
    pub fn message(&self) -> &str {
        match self {
            Self::Transport {
                server_message: Some(server),
                ..
            } => server,
            Self::Transport { message, .. } | Self::Decode { message } => message,
        }
    }

    /// Server-supplied message, if the failure carried one
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Transport { server_message, .. } => server_message.as_deref(),
            Self::Decode { .. } => None,
        }
    }

    /// HTTP status of a transport failure
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport { status, .. } => *status,
            Self::Decode { .. } => None,
        }
    }

    /// Check if this is a decode failure
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode { .. })
    }

    /// Check if this is a transport failure
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }
}

impl From<Error> for FetchFailure {
    fn from(err: Error) -> Self {
        match err {
            Error::Fetch(failure) => failure,
            Error::Decode { .. } | Error::JsonParse(_) => Self::Decode {
                message: err.to_string(),
            },
            Error::HttpStatus { status, .. } => Self::Transport {
                server_message: err.server_message(),
                message: err.to_string(),
                status: Some(status),
            },
            Error::Http(ref e) => Self::Transport {
                status: e.status().map(|s| s.as_u16()),
                message: err.to_string(),
                server_message: None,
            },
            other => Self::Transport {
                message: other.to_string(),
                status: None,
                server_message: None,
            },
        }
    }
}

/// Result type alias for pagewalk
pub type Result<T> = std::result::Result<T, Error>;
