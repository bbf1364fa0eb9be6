//! HTTP fetch module
//!
//! A ready-made [`Fetcher`](crate::fetch::Fetcher) over reqwest, so a page
//! iterator can be pointed straight at a REST endpoint.
//!
//! # Features
//!
//! - **Automatic Retries**: 429, 5xx, timeouts and connect errors, with backoff
//! - **Rate Limiting**: Token bucket rate limiter using governor
//! - **Deferred Bodies**: responses are handed back unread, as `RawResponse::Pending`

mod client;
mod rate_limit;

pub use client::HttpFetcher;
pub use rate_limit::RateLimiter;
