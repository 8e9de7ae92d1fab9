use crate::models::{PageRequest, PaginationInfo};

/// Default rows per page when the request enables paging without a size.
pub const DEFAULT_PAGE_SIZE: u64 = 25;

/// Default upper bound on the requested page size.
pub const DEFAULT_MAX_PAGE_SIZE: u64 = 100;

/// The fetch window derived from a [`PageRequest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub offset: u64,
    /// `None` when paging is disabled and every row is fetched.
    pub limit: Option<u64>,
    pub info: PaginationInfo,
}

/// Compute the page window and bookkeeping for a known total count.
///
/// Pure arithmetic: never errors, only clamps. `page_size` clamps into
/// `[1, max_page_size]` and `page` into `[1, ∞)` before the offset is
/// computed; `current_page` is derived from the clamped page
/// (`min(page, total_pages)`) rather than back-computed from the offset.
#[must_use]
pub fn plan_pagination(request: &PageRequest, max_page_size: u64, total: u64) -> PageWindow {
    if !request.enabled {
        return PageWindow {
            offset: 0,
            limit: None,
            info: PaginationInfo {
                total,
                current_page: 1,
                total_pages: 1,
                page_size: total.max(1),
            },
        };
    }

    let page_size = request
        .page_size
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, max_page_size.max(1));
    let page = request.page.unwrap_or(1).max(1);
    let offset = (page - 1).saturating_mul(page_size);
    let total_pages = total.div_ceil(page_size).max(1);

    PageWindow {
        offset,
        limit: Some(page_size),
        info: PaginationInfo {
            total,
            current_page: page.min(total_pages),
            total_pages,
            page_size,
        },
    }
}
