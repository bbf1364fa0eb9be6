//! Decoder types and traits
//!
//! Defines the normalized envelope every raw response is turned into.

use crate::error::Result;
use crate::fetch::RawResponse;
use crate::pagination::PaginationState;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

/// Item payload of a response: a page of records or one record.
///
/// Decided once at decode time from whether `data` was a JSON array.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponseData<T> {
    /// An ordered page of records
    Sequence(Vec<T>),
    /// A single record (singular resource)
    Single(T),
}

impl<T> Default for ResponseData<T> {
    fn default() -> Self {
        Self::Sequence(Vec::new())
    }
}

impl<T> ResponseData<T> {
    /// Number of records held
    pub fn len(&self) -> usize {
        match self {
            Self::Sequence(items) => items.len(),
            Self::Single(_) => 1,
        }
    }

    /// Check if there are no records
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check if this is a single record
    pub fn is_single(&self) -> bool {
        matches!(self, Self::Single(_))
    }

    /// Record at a local index; a single record sits at index 0
    pub fn get(&self, index: usize) -> Option<&T> {
        match self {
            Self::Sequence(items) => items.get(index),
            Self::Single(item) => (index == 0).then_some(item),
        }
    }

    /// Records as a slice
    pub fn as_slice(&self) -> &[T] {
        match self {
            Self::Sequence(items) => items,
            Self::Single(item) => std::slice::from_ref(item),
        }
    }

    /// The lone record, if this is a single record
    pub fn as_single(&self) -> Option<&T> {
        match self {
            Self::Single(item) => Some(item),
            Self::Sequence(_) => None,
        }
    }

    /// Convert every record, keeping the shape
    pub fn try_map<U, E, F>(self, mut f: F) -> std::result::Result<ResponseData<U>, E>
    where
        F: FnMut(T) -> std::result::Result<U, E>,
    {
        match self {
            Self::Sequence(items) => items
                .into_iter()
                .map(f)
                .collect::<std::result::Result<Vec<_>, _>>()
                .map(ResponseData::Sequence),
            Self::Single(item) => f(item).map(ResponseData::Single),
        }
    }
}

/// Normalized result of decoding one response
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ResponseEnvelope<T = Value> {
    /// Records carried by the response
    pub data: ResponseData<T>,
    /// Page descriptor; `None` means keep the current pagination
    #[serde(rename = "page", skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PaginationState>,
    /// Server message, empty when absent
    pub message: String,
}

impl<T> ResponseEnvelope<T> {
    /// Create an envelope holding a page of records
    pub fn sequence(items: Vec<T>) -> Self {
        Self {
            data: ResponseData::Sequence(items),
            pagination: None,
            message: String::new(),
        }
    }

    /// Create an envelope holding one record
    pub fn single(item: T) -> Self {
        Self {
            data: ResponseData::Single(item),
            pagination: None,
            message: String::new(),
        }
    }

    /// Attach a page descriptor
    #[must_use]
    pub fn with_pagination(mut self, pagination: PaginationState) -> Self {
        self.pagination = Some(pagination);
        self
    }

    /// Attach a server message
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }
}

/// Key names of the response envelope
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecoderConfig {
    /// Key holding the record(s)
    pub data_key: String,
    /// Key holding the page descriptor
    pub page_key: String,
    /// Key holding the server message
    pub message_key: String,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            data_key: "data".to_string(),
            page_key: "page".to_string(),
            message_key: "message".to_string(),
        }
    }
}

impl DecoderConfig {
    /// Create the default key layout (`data`, `page`, `message`)
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the data key
    #[must_use]
    pub fn with_data_key(mut self, key: impl Into<String>) -> Self {
        self.data_key = key.into();
        self
    }

    /// Set the page descriptor key
    #[must_use]
    pub fn with_page_key(mut self, key: impl Into<String>) -> Self {
        self.page_key = key.into();
        self
    }

    /// Set the message key
    #[must_use]
    pub fn with_message_key(mut self, key: impl Into<String>) -> Self {
        self.message_key = key.into();
        self
    }
}

/// Trait for turning raw responses into envelopes
#[async_trait]
pub trait ResponseDecoder: Send + Sync {
    /// Decode an already-parsed body
    fn decode_value(&self, body: Value) -> ResponseEnvelope;

    /// Complete the raw response if needed, then decode it
    async fn decode(&self, raw: RawResponse) -> Result<ResponseEnvelope> {
        let body = raw.into_json().await?;
        Ok(self.decode_value(body))
    }
}
