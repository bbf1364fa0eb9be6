//! Response decoder module
//!
//! # Overview
//!
//! Every raw response, whether its body is already parsed or still has to be
//! read, is normalized into a [`ResponseEnvelope`]: the record(s), an optional
//! page descriptor and a message. The iterator only ever looks at envelopes.

mod decoders;
mod types;

pub use decoders::EnvelopeDecoder;
pub use types::{DecoderConfig, ResponseData, ResponseDecoder, ResponseEnvelope};
