//! Pagination module
//!
//! # Overview
//!
//! `PaginationState` is the value the server reports in the `page` block of
//! every paged response: current page, page size and totals. The iterator
//! adopts it wholesale after each fetch and derives its offsets from it.

mod types;

pub use types::{
    PaginationState, DEFAULT_ITEMS_PER_PAGE, MAX_ITEMS_PER_PAGE, MIN_ITEMS_PER_PAGE,
};
