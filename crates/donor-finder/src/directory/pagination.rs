/// Maximum number of numbered page links shown at once.
pub const PAGE_WINDOW: u32 = 5;

/// Page links to render: up to [`PAGE_WINDOW`] pages centered on `current`,
/// kept inside `1..=total_pages` and shifted inward near either edge.
pub fn page_window(current: u32, total_pages: u32) -> Vec<u32> {
    let total = total_pages.max(1);
    let current = current.clamp(1, total);
    let width = PAGE_WINDOW.min(total);

    let half = PAGE_WINDOW / 2;
    let mut start = current.saturating_sub(half).max(1);
    if start.saturating_add(width - 1) > total {
        start = total - (width - 1);
    }
    (start..=start + (width - 1)).collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationView {
    pub current: u32,
    pub total_pages: u32,
    pub pages: Vec<u32>,
    pub has_previous: bool,
    pub has_next: bool,
}

impl PaginationView {
    pub fn new(current: u32, total_pages: u32, has_next: bool) -> Self {
        Self {
            current,
            total_pages,
            pages: page_window(current, total_pages),
            has_previous: current > 1,
            has_next,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_is_centered_on_current_page() {
        assert_eq!(page_window(7, 10), vec![5, 6, 7, 8, 9]);
    }

    #[test]
    fn window_shifts_inward_at_edges() {
        assert_eq!(page_window(1, 10), vec![1, 2, 3, 4, 5]);
        assert_eq!(page_window(2, 10), vec![1, 2, 3, 4, 5]);
        assert_eq!(page_window(10, 10), vec![6, 7, 8, 9, 10]);
        assert_eq!(page_window(9, 10), vec![6, 7, 8, 9, 10]);
    }

    #[test]
    fn window_never_exceeds_total_pages() {
        assert_eq!(page_window(1, 1), vec![1]);
        assert_eq!(page_window(3, 3), vec![1, 2, 3]);
        assert_eq!(page_window(2, 0), vec![1]);
        assert_eq!(page_window(40, 4), vec![1, 2, 3, 4]);
    }

    #[test]
    fn window_at_the_top_of_the_range_does_not_overflow() {
        assert_eq!(
            page_window(u32::MAX, u32::MAX),
            vec![u32::MAX - 4, u32::MAX - 3, u32::MAX - 2, u32::MAX - 1, u32::MAX]
        );
    }

    #[test]
    fn previous_is_disabled_on_first_page() {
        let view = PaginationView::new(1, 2, true);
        assert!(!view.has_previous);
        assert!(view.has_next);
    }
}
