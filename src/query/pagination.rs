/// Offset pagination over a list endpoint.
///
/// `index` is zero-based; views show `index + 1`. Whether another page
/// exists is inferred from the last page being full, which is a heuristic
/// rather than an authoritative answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Pager {
    pub index: u32,
    pub size: u64,
}

impl Pager {
    pub fn new(index: u32, size: u64) -> Self {
        Self { index, size }
    }

    /// Pager for a one-based page number as typed by a user; `0` is read as
    /// the first page.
    pub fn from_page_number(page: u32, size: u64) -> Self {
        Self::new(page.saturating_sub(1), size)
    }

    pub fn skip(&self) -> u64 {
        u64::from(self.index) * self.size
    }

    pub fn limit(&self) -> u64 {
        self.size
    }

    pub fn page_number(&self) -> u32 {
        self.index.saturating_add(1)
    }

    pub fn has_previous_page(&self) -> bool {
        self.index > 0
    }

    /// `rows` is the length of the page just fetched for this pager.
    /// Placeholder data never enables paging forward.
    pub fn has_next_page(&self, rows: usize, is_placeholder: bool) -> bool {
        !is_placeholder && rows as u64 == self.size
    }

    pub fn next(&self) -> Self {
        Self::new(self.index.saturating_add(1), self.size)
    }

    pub fn previous(&self) -> Self {
        Self::new(self.index.saturating_sub(1), self.size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skip_is_index_times_size() {
        assert_eq!(Pager::new(0, 5).skip(), 0);
        assert_eq!(Pager::new(3, 5).skip(), 15);
    }

    #[test]
    fn page_numbers_are_one_based() {
        let pager = Pager::from_page_number(2, 5);
        assert_eq!(pager.index, 1);
        assert_eq!(pager.page_number(), 2);
        assert_eq!(Pager::from_page_number(0, 5).index, 0);
    }

    #[test]
    fn next_page_requires_full_page() {
        let pager = Pager::new(0, 5);
        assert!(pager.has_next_page(5, false));
        assert!(!pager.has_next_page(4, false));
        assert!(!pager.has_next_page(0, false));
    }

    #[test]
    fn placeholder_data_disables_next_page() {
        assert!(!Pager::new(0, 5).has_next_page(5, true));
    }

    #[test]
    fn previous_page_only_after_first() {
        assert!(!Pager::new(0, 5).has_previous_page());
        assert!(Pager::new(1, 5).has_previous_page());
        assert_eq!(Pager::new(0, 5).previous().index, 0);
        assert_eq!(Pager::new(1, 5).next().index, 2);
    }

    #[test]
    fn last_representable_page_does_not_overflow() {
        let pager = Pager::new(u32::MAX, 5);
        assert_eq!(pager.page_number(), u32::MAX);
        assert_eq!(pager.next().index, u32::MAX);
        assert_eq!(Pager::from_page_number(u32::MAX, 5).page_number(), u32::MAX);
    }
}
