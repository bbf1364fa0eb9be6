//! Fetch types and traits
//!
//! The capability the iterator is built on: given a resource path and a
//! request configuration, produce a raw response or fail.

use crate::error::{Error, Result};
use crate::pagination::PaginationState;
use crate::types::{Method, StringMap};
use async_trait::async_trait;
use bytes::Bytes;
use futures::future::BoxFuture;
use futures::FutureExt;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Query parameter carrying the requested page number
pub const PAGE_PARAM: &str = "page";

/// Query parameter carrying the requested page size
pub const ITEMS_PER_PAGE_PARAM: &str = "items_per_page";

/// Request template for a paged resource.
///
/// The iterator never mutates the caller's template; each fetch works on a
/// copy produced by [`RequestConfig::with_pagination`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestConfig {
    /// HTTP method
    pub method: Method,
    /// Query parameters
    pub params: StringMap,
    /// Request headers
    pub headers: StringMap,
    /// Request body (JSON)
    pub body: Option<Value>,
}

impl RequestConfig {
    /// Create a new request config
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the HTTP method
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Add a query parameter
    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Add a header
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Set JSON body
    #[must_use]
    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Per-call copy of this template with `page` and `items_per_page` set
    /// from the given pagination. Existing values for those keys are replaced.
    pub fn with_pagination(&self, pagination: &PaginationState) -> Self {
        let mut config = self.clone();
        config.params.insert(
            ITEMS_PER_PAGE_PARAM.to_string(),
            pagination.items_per_page.to_string(),
        );
        config
            .params
            .insert(PAGE_PARAM.to_string(), pagination.current_page.to_string());
        config
    }
}

/// A response handed back by a [`Fetcher`].
///
/// Either the body is already parsed, or reading it is one more async step
/// (a streamed HTTP body, for instance).
pub enum RawResponse {
    /// Body already materialized as JSON
    Ready(Value),
    /// Body still to be read
    Pending(BoxFuture<'static, Result<Bytes>>),
}

impl RawResponse {
    /// Wrap an already-parsed body
    pub fn ready(body: Value) -> Self {
        Self::Ready(body)
    }

    /// Wrap a body that still has to be awaited
    pub fn pending<F>(body: F) -> Self
    where
        F: std::future::Future<Output = Result<Bytes>> + Send + 'static,
    {
        Self::Pending(body.boxed())
    }

    /// Defer reading an HTTP response body
    pub fn from_http(response: reqwest::Response) -> Self {
        Self::pending(async move { response.bytes().await.map_err(Error::Http) })
    }

    /// Check if the body is already available
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    /// Complete the body and parse it as JSON. An empty body reads as `null`.
    pub async fn into_json(self) -> Result<Value> {
        match self {
            Self::Ready(value) => Ok(value),
            Self::Pending(body) => {
                let bytes = body.await?;
                if bytes.iter().all(u8::is_ascii_whitespace) {
                    return Ok(Value::Null);
                }
                serde_json::from_slice(&bytes)
                    .map_err(|e| Error::decode(format!("Failed to parse JSON body: {e}")))
            }
        }
    }
}

impl fmt::Debug for RawResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready(value) => f.debug_tuple("Ready").field(value).finish(),
            Self::Pending(_) => f.write_str("Pending(..)"),
        }
    }
}

/// The fetch capability a page iterator is driven by
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Issue one request for `path` and return the raw response
    async fn fetch(&self, path: &str, config: &RequestConfig) -> Result<RawResponse>;
}

#[async_trait]
impl<T: Fetcher + ?Sized> Fetcher for Arc<T> {
    async fn fetch(&self, path: &str, config: &RequestConfig) -> Result<RawResponse> {
        (**self).fetch(path, config).await
    }
}

#[async_trait]
impl<T: Fetcher + ?Sized> Fetcher for Box<T> {
    async fn fetch(&self, path: &str, config: &RequestConfig) -> Result<RawResponse> {
        (**self).fetch(path, config).await
    }
}
