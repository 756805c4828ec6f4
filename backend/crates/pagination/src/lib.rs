//! Page-number pagination primitives shared by devcamper list endpoints.
//!
//! A [`PageRequest`] is parsed leniently from the `page` and `limit` query
//! parameters, converted into a [`PageWindow`] (the skip/limit slice applied
//! to the store query), and combined with the total number of matching
//! documents to produce the [`Pagination`] descriptor returned to clients.
//!
//! ```
//! use pagination::{PageRequest, Pagination};
//!
//! let request = PageRequest::from_query(Some("2"), Some("10"));
//! let pagination = Pagination::build(request, 35);
//! assert_eq!(pagination.next.map(|link| link.page), Some(3));
//! assert_eq!(pagination.prev.map(|link| link.page), Some(1));
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Page used when the `page` parameter is missing or unusable.
pub const DEFAULT_PAGE: u64 = 1;
/// Page size used when the `limit` parameter is missing or unusable.
pub const DEFAULT_LIMIT: u64 = 25;

/// Errors raised by the strict [`PageRequest::new`] constructor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageRequestError {
    /// Pages are numbered from one.
    #[error("page must be at least 1, got {page}")]
    PageOutOfRange {
        /// Rejected page number.
        page: u64,
    },
    /// A page must hold at least one document.
    #[error("limit must be at least 1, got {limit}")]
    LimitOutOfRange {
        /// Rejected page size.
        limit: u64,
    },
}

/// Requested page number and page size.
///
/// ## Invariants
/// - `page >= 1`
/// - `limit >= 1`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u64,
    limit: u64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PageRequest {
    /// Strict constructor rejecting zero values.
    ///
    /// # Errors
    /// Returns [`PageRequestError`] when `page` or `limit` is zero.
    pub const fn new(page: u64, limit: u64) -> Result<Self, PageRequestError> {
        if page == 0 {
            return Err(PageRequestError::PageOutOfRange { page });
        }
        if limit == 0 {
            return Err(PageRequestError::LimitOutOfRange { limit });
        }
        Ok(Self { page, limit })
    }

    /// Lenient constructor used for raw query parameters.
    ///
    /// Each value is read as a leading decimal integer (trailing garbage is
    /// ignored, so `"3rd"` reads as 3). Missing, non-numeric, zero, negative,
    /// or overflowing values fall back to [`DEFAULT_PAGE`] and
    /// [`DEFAULT_LIMIT`]. This never fails.
    #[must_use]
    pub fn from_query(page: Option<&str>, limit: Option<&str>) -> Self {
        Self {
            page: page.and_then(leading_positive_integer).unwrap_or(DEFAULT_PAGE),
            limit: limit.and_then(leading_positive_integer).unwrap_or(DEFAULT_LIMIT),
        }
    }

    /// One-based page number.
    #[must_use]
    pub const fn page(&self) -> u64 {
        self.page
    }

    /// Maximum number of documents on the page.
    #[must_use]
    pub const fn limit(&self) -> u64 {
        self.limit
    }

    /// Slice of the ordered result set covered by this page.
    #[must_use]
    pub const fn window(&self) -> PageWindow {
        PageWindow {
            start_index: (self.page - 1).saturating_mul(self.limit),
            end_index: self.page.saturating_mul(self.limit),
        }
    }
}

/// Half-open index range `[start_index, end_index)` of one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    /// Index of the first document on the page; used as the skip count.
    pub start_index: u64,
    /// Index one past the last document the page may hold.
    pub end_index: u64,
}

impl PageWindow {
    /// Number of documents to skip before the page starts.
    #[must_use]
    pub const fn skip(&self) -> u64 {
        self.start_index
    }

    /// Number of documents the page may hold.
    #[must_use]
    pub const fn len(&self) -> u64 {
        self.end_index - self.start_index
    }

    /// Whether the window can hold no documents.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Link to an adjacent page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLink {
    /// Target page number.
    pub page: u64,
    /// Page size carried over from the current request.
    pub limit: u64,
}

/// Adjacent-page descriptor included in list envelopes.
///
/// Serialises to `{}` on a single-page result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    /// Present iff documents remain beyond the current page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<PageLink>,
    /// Present iff the current page does not start at the first document.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev: Option<PageLink>,
}

impl Pagination {
    /// Build the descriptor for `request` given `total` matching documents.
    #[must_use]
    pub const fn build(request: PageRequest, total: u64) -> Self {
        let window = request.window();
        let next = if window.end_index < total {
            Some(PageLink {
                page: request.page.saturating_add(1),
                limit: request.limit,
            })
        } else {
            None
        };
        let prev = if window.start_index > 0 {
            Some(PageLink {
                page: request.page - 1,
                limit: request.limit,
            })
        } else {
            None
        };
        Self { next, prev }
    }
}

fn leading_positive_integer(raw: &str) -> Option<u64> {
    let digits: String = raw
        .trim_start()
        .trim_start_matches('+')
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse::<u64>().ok().filter(|value| *value >= 1)
}

#[cfg(test)]
mod tests {
    //! Unit coverage for page parsing and descriptor construction.

    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(None, None, 1, 25)]
    #[case(Some("2"), Some("10"), 2, 10)]
    #[case(Some("abc"), Some("xyz"), 1, 25)]
    #[case(Some("0"), Some("0"), 1, 25)]
    #[case(Some("-3"), Some("-1"), 1, 25)]
    #[case(Some("3rd"), Some("5 per page"), 3, 5)]
    #[case(Some(" 4"), Some("+7"), 4, 7)]
    #[case(Some("99999999999999999999999"), Some(""), 1, 25)]
    fn from_query_falls_back_to_defaults(
        #[case] page: Option<&str>,
        #[case] limit: Option<&str>,
        #[case] expected_page: u64,
        #[case] expected_limit: u64,
    ) {
        let request = PageRequest::from_query(page, limit);
        assert_eq!(request.page(), expected_page);
        assert_eq!(request.limit(), expected_limit);
    }

    #[rstest]
    #[case(0, 10)]
    #[case(1, 0)]
    fn new_rejects_zero_values(#[case] page: u64, #[case] limit: u64) {
        assert!(PageRequest::new(page, limit).is_err());
    }

    #[rstest]
    fn window_covers_requested_slice() {
        let window = PageRequest::new(3, 20).expect("valid request").window();
        assert_eq!(window.start_index, 40);
        assert_eq!(window.end_index, 60);
        assert_eq!(window.skip(), 40);
        assert_eq!(window.len(), 20);
    }

    #[rstest]
    #[case(1, 25, 0, false, false)]
    #[case(1, 25, 25, false, false)]
    #[case(1, 25, 26, true, false)]
    #[case(2, 2, 5, true, true)]
    #[case(3, 2, 5, false, true)]
    #[case(4, 2, 5, false, true)]
    #[case(1, 1, 1, false, false)]
    fn descriptor_follows_window_bounds(
        #[case] page: u64,
        #[case] limit: u64,
        #[case] total: u64,
        #[case] has_next: bool,
        #[case] has_prev: bool,
    ) {
        let request = PageRequest::new(page, limit).expect("valid request");
        let pagination = Pagination::build(request, total);
        assert_eq!(pagination.next.is_some(), page * limit < total);
        assert_eq!(pagination.next.is_some(), has_next);
        assert_eq!(pagination.prev.is_some(), (page - 1) * limit > 0);
        assert_eq!(pagination.prev.is_some(), has_prev);
    }

    #[rstest]
    fn links_carry_adjacent_pages_and_limit() {
        let request = PageRequest::new(2, 2).expect("valid request");
        let pagination = Pagination::build(request, 5);
        assert_eq!(pagination.next, Some(PageLink { page: 3, limit: 2 }));
        assert_eq!(pagination.prev, Some(PageLink { page: 1, limit: 2 }));
    }

    #[rstest]
    fn following_next_visits_every_index_once() {
        let total = 23_u64;
        let mut request = PageRequest::new(1, 5).expect("valid request");
        let mut visited = Vec::new();
        loop {
            let window = request.window();
            visited.extend(window.start_index..window.end_index.min(total));
            match Pagination::build(request, total).next {
                Some(link) => {
                    request = PageRequest::new(link.page, link.limit).expect("valid link");
                }
                None => break,
            }
        }
        assert_eq!(visited, (0..total).collect::<Vec<_>>());
    }

    #[rstest]
    fn single_page_serialises_to_empty_object() {
        let pagination = Pagination::build(PageRequest::default(), 3);
        let json = serde_json::to_value(pagination).expect("serialise pagination");
        assert_eq!(json, serde_json::json!({}));
    }
}
