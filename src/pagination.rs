//! Page slicing for the browse list.
//!
//! Pages are 1-based. A requested page past the end is clamped to the last
//! page and the clamped value is reported back, so a caller whose list just
//! shrank (delete, stricter filter) can correct its own page state.

use serde::Serialize;

/// Default number of issues per browse page.
pub const DEFAULT_PAGE_SIZE: usize = 12;

/// One page of a larger collection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Page actually served, after clamping.
    pub page: usize,
    pub total_pages: usize,
    /// Size of the whole collection, not just this page.
    pub total_items: usize,
}

impl<T> Page<T> {
    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

/// `ceil(count / page_size)`, never less than 1.
pub fn total_pages(count: usize, page_size: usize) -> usize {
    let page_size = page_size.max(1);
    count.div_ceil(page_size).max(1)
}

/// Clamp a requested page into `1..=total_pages`.
///
/// Takes a signed value because page numbers arrive from user input; zero
/// and negatives mean page 1.
pub fn effective_page(requested: i64, total_pages: usize) -> usize {
    let requested = usize::try_from(requested).unwrap_or(0).max(1);
    requested.min(total_pages.max(1))
}

/// Slice `items` into the page the caller asked for.
pub fn paginate<T: Clone>(items: &[T], page_size: usize, requested_page: i64) -> Page<T> {
    let page_size = page_size.max(1);
    let total_pages = total_pages(items.len(), page_size);
    let page = effective_page(requested_page, total_pages);

    let start = (page - 1) * page_size;
    let end = (start + page_size).min(items.len());
    let items_on_page = items.get(start..end).map(<[T]>::to_vec).unwrap_or_default();

    Page {
        items: items_on_page,
        page,
        total_pages,
        total_items: items.len(),
    }
}
