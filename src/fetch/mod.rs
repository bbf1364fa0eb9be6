//! Fetch module
//!
//! The seam between the page iterator and whatever transport issues the
//! request. The iterator only sees [`Fetcher`], a [`RequestConfig`] template
//! and the [`RawResponse`] that comes back.

mod types;

pub use types::{Fetcher, RawResponse, RequestConfig, ITEMS_PER_PAGE_PARAM, PAGE_PARAM};
