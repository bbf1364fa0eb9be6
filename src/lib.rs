//! # pagewalk
//!
//! Walk a paged REST collection as if it were one sequence.
//!
//! ## Features
//!
//! - **Page Iterator**: cursor/offset arithmetic over server-reported pages
//! - **Lazy Fetching**: pages are requested only when navigation needs them
//! - **Single Records**: endpoints answering with one object switch into single-item mode
//! - **Dual Error Channel**: every call returns `Result`, and the last failure stays readable
//! - **HTTP Fetcher**: reqwest client with retry, backoff and rate limiting
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pagewalk::{ClientConfig, HttpFetcher, PageIterator, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let fetcher = HttpFetcher::with_config(
//!         ClientConfig::new().with_base_url("https://api.example.com"),
//!     )?;
//!
//!     let mut books = PageIterator::<_, serde_json::Value>::new(fetcher, "/book/list");
//!     books.set_items_per_page(50).await?;
//!
//!     while let Some(book) = books.next().await? {
//!         println!("{book}");
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │                        PageIterator                           │
//! │  next()  current()  get_page()  go_to_page()  collect_all()   │
//! └───────────────────────────────────────────────────────────────┘
//!                                │
//! ┌─────────────────┬────────────┴──────────┬────────────────────┐
//! │     Fetcher     │    ResponseDecoder    │  PaginationState   │
//! ├─────────────────┼───────────────────────┼────────────────────┤
//! │ HttpFetcher     │ EnvelopeDecoder       │ offset, clamping   │
//! │ Retry, Backoff  │ data / page / message │ lenient descriptor │
//! │ Rate Limit      │ Sequence | Single     │                    │
//! └─────────────────┴───────────────────────┴────────────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::unused_self)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for pagewalk
pub mod error;

/// Common types and type aliases
pub mod types;

/// Pagination state and page arithmetic
pub mod pagination;

/// Fetch capability and request templates
pub mod fetch;

/// Response envelope decoding
pub mod decode;

/// Stateful page iterator
pub mod iterator;

/// HTTP fetcher with retry and rate limiting
pub mod http;

/// Client configuration
pub mod config;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, FetchFailure, Result};
pub use types::*;

pub use config::{ClientConfig, RateLimitConfig, RetryConfig};
pub use decode::{EnvelopeDecoder, ResponseData, ResponseDecoder, ResponseEnvelope};
pub use fetch::{Fetcher, RawResponse, RequestConfig};
pub use http::HttpFetcher;
pub use iterator::PageIterator;
pub use pagination::PaginationState;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
