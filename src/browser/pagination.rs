pub const PAGE_SIZE: usize = 20;

/// One entry of the page control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageItem {
    Page(usize),
    Ellipsis,
}

/// Never less than one, so an empty result still has a well-formed control.
pub fn total_pages(count: usize) -> usize {
    count.div_ceil(PAGE_SIZE).max(1)
}

pub fn clamp_page(page: usize, total_pages: usize) -> usize {
    page.clamp(1, total_pages.max(1))
}

/// The `page`-th slice (1-indexed) of `items`. Out-of-range pages are clamped.
pub fn paginate<T>(items: &[T], page: usize) -> &[T] {
    let page = clamp_page(page, total_pages(items.len()));
    let start = ((page - 1) * PAGE_SIZE).min(items.len());
    let end = (start + PAGE_SIZE).min(items.len());
    &items[start..end]
}

/// First page, a window of one page either side of `current`, and the last
/// page, with an ellipsis wherever the window does not touch either end.
pub fn page_indicators(current: usize, total_pages: usize) -> Vec<PageItem> {
    let total = total_pages.max(1);
    let current = clamp_page(current, total);

    let mut items = vec![PageItem::Page(1)];
    let start = current.saturating_sub(1).max(2);
    let end = (current + 1).min(total.saturating_sub(1));

    if start > 2 && start <= end {
        items.push(PageItem::Ellipsis);
    }
    for page in start..=end {
        items.push(PageItem::Page(page));
    }
    if end < total.saturating_sub(1) {
        items.push(PageItem::Ellipsis);
    }
    if total > 1 {
        items.push(PageItem::Page(total));
    }
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use PageItem::{Ellipsis, Page};

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(0), 1);
        assert_eq!(total_pages(1), 1);
        assert_eq!(total_pages(20), 1);
        assert_eq!(total_pages(21), 2);
        assert_eq!(total_pages(45), 3);
    }

    #[test]
    fn test_pages_reconstruct_sequence() {
        for n in [0usize, 1, 19, 20, 21, 39, 40, 41, 99, 100, 101] {
            let items: Vec<usize> = (0..n).collect();
            let pages = total_pages(n);
            let mut joined = Vec::new();
            for page in 1..=pages {
                let slice = paginate(&items, page);
                assert!(slice.len() <= PAGE_SIZE);
                if page < pages {
                    assert_eq!(slice.len(), PAGE_SIZE);
                }
                joined.extend_from_slice(slice);
            }
            assert_eq!(joined, items, "n = {}", n);
        }
    }

    #[test]
    fn test_paginate_clamps() {
        let items: Vec<usize> = (0..25).collect();
        assert_eq!(paginate(&items, 0), &items[0..20]);
        assert_eq!(paginate(&items, 9), &items[20..25]);
        let empty: Vec<usize> = Vec::new();
        assert!(paginate(&empty, 3).is_empty());
    }

    #[test]
    fn test_indicator_middle() {
        assert_eq!(
            page_indicators(5, 10),
            vec![Page(1), Ellipsis, Page(4), Page(5), Page(6), Ellipsis, Page(10)]
        );
    }

    #[test]
    fn test_indicator_small_totals() {
        assert_eq!(page_indicators(1, 1), vec![Page(1)]);
        assert_eq!(page_indicators(1, 2), vec![Page(1), Page(2)]);
        for current in 1..=3 {
            assert_eq!(page_indicators(current, 3), vec![Page(1), Page(2), Page(3)]);
        }
    }

    #[test]
    fn test_indicator_edges() {
        assert_eq!(page_indicators(1, 10), vec![Page(1), Page(2), Ellipsis, Page(10)]);
        assert_eq!(page_indicators(10, 10), vec![Page(1), Ellipsis, Page(9), Page(10)]);
        assert_eq!(page_indicators(3, 10), vec![Page(1), Page(2), Page(3), Page(4), Ellipsis, Page(10)]);
    }

    #[test]
    fn test_indicator_stays_compact() {
        for total in 1..200 {
            for current in 1..=total {
                let items = page_indicators(current, total);
                assert!(items.len() <= 7, "total {} current {}", total, current);
                assert_eq!(items.first(), Some(&Page(1)));
                if total > 1 {
                    assert_eq!(items.last(), Some(&Page(total)));
                }
                assert!(items.contains(&Page(current)));
            }
        }
    }
}
