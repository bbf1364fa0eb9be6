//! Pagination state
//!
//! The page descriptor a paged endpoint reports alongside its data, and the
//! arithmetic the iterator needs on top of it.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Page size used when neither the caller nor the server supplied one
pub const DEFAULT_ITEMS_PER_PAGE: u32 = 24;

/// Smallest page size a caller may request
pub const MIN_ITEMS_PER_PAGE: u32 = 1;

/// Largest page size a caller may request
pub const MAX_ITEMS_PER_PAGE: u32 = 500;

/// Where the iterator stands in a paged result set.
///
/// Field names on the wire follow the `page` block of the response envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationState {
    /// 1-based page number
    pub current_page: u32,
    /// Next page number, when the server reports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_page: Option<u32>,
    /// Total items across all pages (0 = unknown)
    #[serde(default)]
    pub total_items: u64,
    /// Total number of pages (0 = unknown)
    #[serde(default)]
    pub total_pages: u32,
    /// Items on each page
    pub items_per_page: u32,
}

impl Default for PaginationState {
    fn default() -> Self {
        Self {
            current_page: 1,
            next_page: None,
            total_items: 0,
            total_pages: 0,
            items_per_page: DEFAULT_ITEMS_PER_PAGE,
        }
    }
}

impl PaginationState {
    /// Create the default state: page 1, 24 items per page, totals unknown
    pub fn new() -> Self {
        Self::default()
    }

    /// Create state starting at a given page
    pub fn with_page(page: u32) -> Self {
        Self {
            current_page: page,
            ..Default::default()
        }
    }

    /// Set the page size
    #[must_use]
    pub fn with_items_per_page(mut self, items_per_page: u32) -> Self {
        self.items_per_page = items_per_page;
        self
    }

    /// Build state from a page descriptor, or the default when there is none.
    ///
    /// Fields are copied verbatim without range checks. A field holding
    /// something other than an integer (or a numeric string) reads as zero.
    pub fn from_descriptor(descriptor: Option<&Value>) -> Self {
        let Some(Value::Object(map)) = descriptor else {
            return Self::default();
        };

        let field = |key: &str| map.get(key).and_then(lenient_u64).unwrap_or(0);

        Self {
            current_page: field("current_page") as u32,
            next_page: Some(field("next_page") as u32).filter(|page| *page > 0),
            total_items: field("total_items"),
            total_pages: field("total_pages") as u32,
            items_per_page: field("items_per_page") as u32,
        }
    }

    /// Logical index of the first item on the current page
    pub fn offset(&self) -> u64 {
        u64::from(self.current_page.saturating_sub(1)) * u64::from(self.items_per_page)
    }

    /// Whether the server has told us how many pages exist
    pub fn has_total_pages(&self) -> bool {
        self.total_pages > 0
    }

    /// Clamp a requested page into `[1, total_pages]`.
    ///
    /// The upper bound only applies once `total_pages` is known.
    pub fn clamp_page(&self, page: i64) -> u32 {
        let mut page = page.max(1);
        if self.has_total_pages() {
            page = page.min(i64::from(self.total_pages));
        }
        u32::try_from(page).unwrap_or(u32::MAX)
    }

    /// Check a caller-requested page size against the accepted range
    pub fn is_valid_items_per_page(items_per_page: i64) -> bool {
        (i64::from(MIN_ITEMS_PER_PAGE)..=i64::from(MAX_ITEMS_PER_PAGE)).contains(&items_per_page)
    }
}

/// Read an integer the way loosely-typed servers send it
fn lenient_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
