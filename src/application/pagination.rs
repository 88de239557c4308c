//! Shared page-number pagination helpers.
//!
//! Management screens paginate by page number and page size rather than by
//! cursor; the helpers here keep the arithmetic in one place so every
//! listing agrees on clamping and the `totalPages` floor of 1.

use serde::Serialize;

/// Hard ceiling on page size, whatever the configured default says.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Sanitized page request. Out-of-range inputs are clamped rather than
/// rejected: page 0 becomes 1 and the limit is forced into `1..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl PageRequest {
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Offset of the first row on this page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }
}

/// One page of results plus the bookkeeping the UI needs to render pagers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub current_page: u32,
    pub total_pages: u32,
    pub total_items: u64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, request: PageRequest, total_items: u64) -> Self {
        Self {
            items,
            current_page: request.page(),
            total_pages: total_pages(total_items, request.limit()),
            total_items,
        }
    }

    /// An empty page past the end of the result set; not an error.
    pub fn beyond_range(request: PageRequest, total_items: u64) -> Self {
        Self::new(Vec::new(), request, total_items)
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            current_page: self.current_page,
            total_pages: self.total_pages,
            total_items: self.total_items,
        }
    }
}

/// `ceil(total_items / limit)`, with a floor of one page so empty result
/// sets still render page 1 of 1.
pub fn total_pages(total_items: u64, limit: u32) -> u32 {
    let limit = u64::from(limit.max(1));
    let pages = total_items.div_ceil(limit).max(1);
    u32::try_from(pages).unwrap_or(u32::MAX)
}
