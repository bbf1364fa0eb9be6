//! Decoder implementations

use super::types::{DecoderConfig, ResponseData, ResponseDecoder, ResponseEnvelope};
use crate::pagination::PaginationState;
use async_trait::async_trait;
use serde_json::Value;

// ============================================================================
// Envelope Decoder
// ============================================================================

/// Decoder for `{"data": ..., "page": {...}, "message": "..."}` bodies.
///
/// Only the recognized keys are read. Values are not type-checked: whatever
/// sits under `data` is passed through, and the sequence/single decision is
/// made solely on whether it is a JSON array.
#[derive(Debug, Clone, Default)]
pub struct EnvelopeDecoder {
    config: DecoderConfig,
}

impl EnvelopeDecoder {
    /// Create a decoder for the default key layout
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a decoder with custom key names
    pub fn with_config(config: DecoderConfig) -> Self {
        Self { config }
    }

    /// Key layout in use
    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }
}

#[async_trait]
impl ResponseDecoder for EnvelopeDecoder {
    fn decode_value(&self, body: Value) -> ResponseEnvelope {
        let Value::Object(mut body) = body else {
            return ResponseEnvelope::default();
        };

        let data = match body.remove(&self.config.data_key) {
            None | Some(Value::Null) => ResponseData::default(),
            Some(Value::Array(items)) => ResponseData::Sequence(items),
            Some(item) => ResponseData::Single(item),
        };

        let pagination = body
            .get(&self.config.page_key)
            .filter(|page| page.is_object())
            .map(|page| PaginationState::from_descriptor(Some(page)));

        let message = match body.remove(&self.config.message_key) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(message)) => message,
            Some(other) => other.to_string(),
        };

        ResponseEnvelope {
            data,
            pagination,
            message,
        }
    }
}
