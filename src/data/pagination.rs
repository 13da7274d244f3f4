//! Pagination stage: slice an ordered row list into fixed-size pages and
//! describe the paginator's page links.

use serde::{Deserialize, Serialize};

use crate::data::schema::DEFAULT_PAGE_SIZE;

/// Page links shown on each side of the current page
pub const DEFAULT_LINK_RADIUS: usize = 1;

/// Number of pages needed for `count` rows. Never less than 1, so an empty
/// result is a single empty page rather than no page at all.
pub fn total_pages(count: usize, page_size: usize) -> usize {
    count.div_ceil(page_size.max(1)).max(1)
}

/// Page size and current page (1-based)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageSpec {
    page_size: usize,
    current_page: usize,
}

impl Default for PageSpec {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            current_page: 1,
        }
    }
}

impl PageSpec {
    /// Start on page 1. A zero page size is raised to 1.
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            current_page: 1,
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    /// Change the page size and return to page 1
    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size.max(1);
        self.current_page = 1;
    }

    /// Pull the current page back into `[1, total]`
    pub fn clamp(&mut self, total: usize) {
        self.current_page = self.current_page.clamp(1, total.max(1));
    }

    /// Jump to page `n`, clamped into `[1, total]`
    pub fn go_to(&mut self, n: usize, total: usize) {
        self.current_page = n.clamp(1, total.max(1));
    }

    /// Advance one page; stays put on the last page
    pub fn next(&mut self, total: usize) -> bool {
        if self.current_page < total {
            self.current_page += 1;
            true
        } else {
            false
        }
    }

    /// Go back one page; stays put on page 1
    pub fn previous(&mut self) -> bool {
        if self.current_page > 1 {
            self.current_page -= 1;
            true
        } else {
            false
        }
    }

    pub fn first(&mut self) {
        self.current_page = 1;
    }

    pub fn last(&mut self, total: usize) {
        self.current_page = total.max(1);
    }

    /// Index range of the current page within `count` ordered rows
    pub fn bounds(&self, count: usize) -> (usize, usize) {
        let start = (self.current_page - 1)
            .saturating_mul(self.page_size)
            .min(count);
        let end = start.saturating_add(self.page_size).min(count);
        (start, end)
    }
}

/// Slice out the current page. Returns the page and the total page count.
pub fn paginate<'a, T>(ordered: &'a [T], spec: &PageSpec) -> (&'a [T], usize) {
    let (start, end) = spec.bounds(ordered.len());
    (
        &ordered[start..end],
        total_pages(ordered.len(), spec.page_size),
    )
}

/// One entry of the paginator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageLink {
    Page(usize),
    /// Placeholder for a run of hidden pages
    Ellipsis,
}

/// Paginator entries for `total` pages with `current` selected.
///
/// Page `i` is shown when it is the first or last page or lies within
/// `radius` of the current page. Every contiguous run of hidden pages
/// collapses into a single ellipsis.
pub fn page_links(total: usize, current: usize, radius: usize) -> Vec<PageLink> {
    let total = total.max(1);
    let current = current.clamp(1, total);
    let low = current.saturating_sub(radius);
    let high = current.saturating_add(radius);

    let mut links = Vec::new();
    for page in 1..=total {
        if page == 1 || page == total || (low..=high).contains(&page) {
            links.push(PageLink::Page(page));
        } else if links.last() != Some(&PageLink::Ellipsis) {
            links.push(PageLink::Ellipsis);
        }
    }
    links
}

#[cfg(test)]
mod tests {
    use super::*;
    use PageLink::{Ellipsis, Page};

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(0, 10), 1);
        assert_eq!(total_pages(1, 10), 1);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
        assert_eq!(total_pages(27, 10), 3);
    }

    #[test]
    fn test_twenty_seven_items_page_of_ten() {
        let items: Vec<u32> = (1..=27).collect();
        let mut spec = PageSpec::new(10);

        let (page, total) = paginate(&items, &spec);
        assert_eq!(total, 3);
        assert_eq!(page, &items[0..10]);

        spec.go_to(3, total);
        let (page, _) = paginate(&items, &spec);
        assert_eq!(page, &[21, 22, 23, 24, 25, 26, 27]);
    }

    #[test]
    fn test_empty_input_is_one_empty_page() {
        let items: Vec<u32> = Vec::new();
        let (page, total) = paginate(&items, &PageSpec::new(10));
        assert!(page.is_empty());
        assert_eq!(total, 1);
    }

    #[test]
    fn test_out_of_range_page_yields_empty_slice() {
        let items: Vec<u32> = (1..=5).collect();
        let mut spec = PageSpec::new(10);
        spec.current_page = 4;
        let (page, total) = paginate(&items, &spec);
        assert!(page.is_empty());
        assert_eq!(total, 1);
    }

    #[test]
    fn test_navigation_clamps() {
        let mut spec = PageSpec::new(10);
        spec.go_to(0, 3);
        assert_eq!(spec.current_page(), 1);
        spec.go_to(4, 3);
        assert_eq!(spec.current_page(), 3);

        assert!(!spec.next(3));
        assert_eq!(spec.current_page(), 3);

        spec.first();
        assert!(!spec.previous());
        assert_eq!(spec.current_page(), 1);
    }

    #[test]
    fn test_set_page_size_resets_to_first_page() {
        let mut spec = PageSpec::new(10);
        spec.go_to(3, 3);
        spec.set_page_size(5);
        assert_eq!(spec.current_page(), 1);
        assert_eq!(spec.page_size(), 5);
    }

    #[test]
    fn test_clamp_after_shrink() {
        let mut spec = PageSpec::new(10);
        spec.go_to(5, 5);
        spec.clamp(2);
        assert_eq!(spec.current_page(), 2);
        spec.clamp(0);
        assert_eq!(spec.current_page(), 1);
    }

    #[test]
    fn test_page_links_small_total_shows_everything() {
        assert_eq!(page_links(1, 1, 1), vec![Page(1)]);
        assert_eq!(page_links(3, 2, 1), vec![Page(1), Page(2), Page(3)]);
    }

    #[test]
    fn test_page_links_middle() {
        assert_eq!(
            page_links(12, 6, 1),
            vec![Page(1), Ellipsis, Page(5), Page(6), Page(7), Ellipsis, Page(12)]
        );
    }

    #[test]
    fn test_page_links_at_edges() {
        assert_eq!(
            page_links(10, 1, 1),
            vec![Page(1), Page(2), Ellipsis, Page(10)]
        );
        assert_eq!(
            page_links(10, 10, 1),
            vec![Page(1), Ellipsis, Page(9), Page(10)]
        );
        // The gap between 1 and 3 is a single page but still one ellipsis
        assert_eq!(
            page_links(10, 4, 1),
            vec![Page(1), Ellipsis, Page(3), Page(4), Page(5), Ellipsis, Page(10)]
        );
        assert_eq!(
            page_links(10, 3, 1),
            vec![Page(1), Page(2), Page(3), Page(4), Ellipsis, Page(10)]
        );
    }

    #[test]
    fn test_page_links_wider_radius() {
        assert_eq!(
            page_links(20, 10, 2),
            vec![
                Page(1),
                Ellipsis,
                Page(8),
                Page(9),
                Page(10),
                Page(11),
                Page(12),
                Ellipsis,
                Page(20)
            ]
        );
    }
}
