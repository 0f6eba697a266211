//! Pagination envelope and page math
//!
//! One rule everywhere: `total_pages = max(1, ceil(total / per_page))` and
//! the requested page is clamped into `[1, total_pages]`. A page past the
//! end returns the last page, never an empty set; an empty table yields a
//! single empty page.

use serde::Serialize;

/// Paginated response envelope
#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total_items: u64,
    pub items_per_page: u64,
    pub total_pages: u64,
    pub current_page: u64,
}

/// Number of pages for a total row count, never zero
pub fn total_pages(total_items: u64, per_page: u64) -> u64 {
    total_items.div_ceil(per_page).max(1)
}

/// Clamp a requested page into the valid range
pub fn clamp_page(requested: u64, total_pages: u64) -> u64 {
    requested.clamp(1, total_pages)
}

/// Row offset of a (clamped) page
pub fn offset(page: u64, per_page: u64) -> u64 {
    (page - 1) * per_page
}
