//! Pagination after ranking.

use std::ops::Range;

/// One page of a ranked list.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    /// Items on the requested page.
    pub items: Vec<T>,
    /// Length of the full list the page was cut from.
    pub total: usize,
}

/// Index range of 1-based `page` in a list of `len` items, clamped to `len`.
pub fn page_bounds(len: usize, page: usize, page_size: usize) -> Range<usize> {
    let start = page
        .saturating_sub(1)
        .saturating_mul(page_size)
        .min(len);
    let end = start.saturating_add(page_size).min(len);
    start..end
}

/// Slice `items` down to 1-based `page`. Out-of-range pages are empty but
/// still report the full `total`.
pub fn paginate<T>(items: Vec<T>, page: usize, page_size: usize) -> Page<T> {
    let total = items.len();
    let bounds = page_bounds(total, page, page_size);
    let items = items
        .into_iter()
        .skip(bounds.start)
        .take(bounds.len())
        .collect();
    Page { items, total }
}
