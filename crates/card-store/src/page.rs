//! Pure pagination arithmetic. These functions never allocate placeholder
//! slots; facades that render fixed grids pad the returned slice
//! themselves.

/// Slots on one binder page (a 3x3 pocket grid).
pub const SLOTS_PER_PAGE: usize = 9;

/// Rows per page in list-style views.
pub const LIST_PAGE_SIZE: usize = 12;

/// Number of pages needed for `len` items, never less than 1 so an empty
/// collection still renders one (empty) page.
pub fn page_count(len: usize, page_size: usize) -> usize {
    let size = page_size.max(1);
    ((len + size - 1) / size).max(1)
}

/// Clamp a requested page index into `[0, total_pages - 1]`.
pub fn clamp_page_index(index: usize, total_pages: usize) -> usize {
    if total_pages == 0 {
        return 0;
    }
    index.min(total_pages - 1)
}

/// The items on a page. Out-of-range pages yield an empty slice rather
/// than an error, so callers can clamp and slice in either order.
pub fn slice_page<T>(items: &[T], page_index: usize, page_size: usize) -> &[T] {
    let size = page_size.max(1);
    let start = page_index.saturating_mul(size).min(items.len());
    let end = start.saturating_add(size).min(items.len());
    &items[start..end]
}
