//! Pagination utilities for the listing page
//!
//! Pages are 0-indexed, matching the registry.

/// Page sizes offered to the user
pub const PAGE_SIZES: [i64; 3] = [10, 20, 50];

/// Page size used when none (or an unsupported one) is requested
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Largest number of numbered slots shown at once
const MAX_VISIBLE_PAGES: i64 = 5;

/// One slot of the page selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSlot {
    /// 0-indexed page number
    Page(i64),
    Ellipsis,
}

/// Keep only the offered page sizes
pub fn normalize_page_size(size: Option<i64>) -> i64 {
    match size {
        Some(s) if PAGE_SIZES.contains(&s) => s,
        _ => DEFAULT_PAGE_SIZE,
    }
}

/// Calculate the page selector slots
///
/// First and last pages are always present; the window around `current`
/// is bounded by ellipses.
///
/// # Examples
/// ```
/// use mpr_web::pagination::{page_window, PageSlot::*};
///
/// assert_eq!(page_window(0, 3), vec![Page(0), Page(1), Page(2)]);
///
/// // Middle of a long listing
/// assert_eq!(
///     page_window(10, 54),
///     vec![Page(0), Ellipsis, Page(9), Page(10), Page(11), Ellipsis, Page(53)]
/// );
/// ```
pub fn page_window(current: i64, total_pages: i64) -> Vec<PageSlot> {
    if total_pages <= MAX_VISIBLE_PAGES {
        return (0..total_pages.max(0)).map(PageSlot::Page).collect();
    }

    let last = total_pages - 1;
    let mut slots = vec![PageSlot::Page(0)];

    if current <= 2 {
        slots.extend((1..=3).map(PageSlot::Page));
        slots.push(PageSlot::Ellipsis);
        slots.push(PageSlot::Page(last));
    } else if current >= total_pages - 3 {
        slots.push(PageSlot::Ellipsis);
        slots.extend((total_pages - 4..total_pages).map(PageSlot::Page));
    } else {
        slots.push(PageSlot::Ellipsis);
        slots.extend((current - 1..=current + 1).map(PageSlot::Page));
        slots.push(PageSlot::Ellipsis);
        slots.push(PageSlot::Page(last));
    }

    slots
}
