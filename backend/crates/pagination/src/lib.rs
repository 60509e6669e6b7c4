//! Page-number pagination primitives.
//!
//! Clients ask for a page with loosely typed query parameters; this crate
//! clamps those values into a [`PageRequest`] and reports the result back as a
//! [`PageMeta`] block inside the response envelope.
//!
//! ## Invariants
//! - `page >= 1`.
//! - `1 <= page_size <= MAX_PAGE_SIZE`.
//! - `total_pages == ceil(total_items / page_size)` whenever both totals are
//!   present.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Page used when the client omits `page` or asks for one below 1.
pub const DEFAULT_PAGE: u32 = 1;
/// Page size used when the client omits `pageSize` or asks for one below 1.
pub const DEFAULT_PAGE_SIZE: u32 = 5;
/// Upper bound applied to `pageSize`.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Number of pages needed to hold `total_items` at `page_size` per page.
///
/// # Examples
/// ```
/// assert_eq!(pagination::total_pages(25, 5), 5);
/// assert_eq!(pagination::total_pages(26, 5), 6);
/// assert_eq!(pagination::total_pages(0, 5), 0);
/// ```
#[must_use]
pub const fn total_pages(total_items: u64, page_size: u32) -> u64 {
    if page_size == 0 {
        return 0;
    }
    total_items.div_ceil(page_size as u64)
}

/// Clamped page selection derived from client input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    page_size: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// Build a request from raw client values, clamping out-of-range input.
    ///
    /// - `page < 1` (or absent) becomes [`DEFAULT_PAGE`].
    /// - `page_size < 1` (or absent) becomes [`DEFAULT_PAGE_SIZE`].
    /// - `page_size > MAX_PAGE_SIZE` becomes [`MAX_PAGE_SIZE`].
    ///
    /// # Examples
    /// ```
    /// use pagination::PageRequest;
    ///
    /// let request = PageRequest::clamped(Some(0), Some(500));
    /// assert_eq!(request.page(), 1);
    /// assert_eq!(request.page_size(), 100);
    /// ```
    #[must_use]
    pub fn clamped(requested_page: Option<i64>, requested_size: Option<i64>) -> Self {
        let page = match requested_page {
            Some(value) if value >= 1 => u32::try_from(value).unwrap_or(u32::MAX),
            _ => DEFAULT_PAGE,
        };
        let page_size = match requested_size {
            Some(value) if value >= 1 => u32::try_from(value)
                .unwrap_or(MAX_PAGE_SIZE)
                .min(MAX_PAGE_SIZE),
            _ => DEFAULT_PAGE_SIZE,
        };
        Self { page, page_size }
    }

    /// One-based page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Items per page.
    #[must_use]
    pub const fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Number of items preceding the requested page.
    #[must_use]
    pub fn offset(&self) -> usize {
        let skipped = u64::from(self.page.saturating_sub(1)) * u64::from(self.page_size);
        usize::try_from(skipped).unwrap_or(usize::MAX)
    }

    /// Borrow the items belonging to this page; pages past the end are empty.
    ///
    /// # Examples
    /// ```
    /// use pagination::PageRequest;
    ///
    /// let items: Vec<u32> = (1..=12).collect();
    /// let request = PageRequest::clamped(Some(3), Some(5));
    /// assert_eq!(request.slice(&items), &[11, 12]);
    /// ```
    #[must_use]
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let start = self.offset().min(items.len());
        let size = usize::try_from(self.page_size).unwrap_or(usize::MAX);
        let end = start.saturating_add(size).min(items.len());
        items.get(start..end).unwrap_or_default()
    }
}

/// Pagination block carried in the envelope `meta` for list endpoints.
///
/// Totals serialise as explicit `null` when unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[serde(try_from = "PageMetaDto", into = "PageMetaDto")]
pub struct PageMeta {
    page: u32,
    page_size: u32,
    total_items: Option<u64>,
    total_pages: Option<u64>,
}

/// Reasons a [`PageMeta`] payload is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PageMetaError {
    /// `page` was zero.
    #[error("page must be at least 1")]
    PageOutOfRange,
    /// `pageSize` fell outside `1..=MAX_PAGE_SIZE`.
    #[error("page size must be between 1 and {MAX_PAGE_SIZE}")]
    PageSizeOutOfRange,
    /// `totalPages` disagrees with `totalItems` and `pageSize`.
    #[error("total pages {actual} does not match expected {expected}")]
    InconsistentTotals {
        /// Value derived from `totalItems` and `pageSize`.
        expected: u64,
        /// Value supplied in the payload.
        actual: u64,
    },
}

impl PageMeta {
    /// Describe a page whose collection size is known.
    ///
    /// # Examples
    /// ```
    /// use pagination::{PageMeta, PageRequest};
    ///
    /// let meta = PageMeta::with_totals(PageRequest::clamped(Some(1), Some(5)), 25);
    /// assert_eq!(meta.total_pages(), Some(5));
    /// ```
    #[must_use]
    pub const fn with_totals(request: PageRequest, total_items: u64) -> Self {
        Self {
            page: request.page,
            page_size: request.page_size,
            total_items: Some(total_items),
            total_pages: Some(total_pages(total_items, request.page_size)),
        }
    }

    /// One-based page number.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Items per page.
    #[must_use]
    pub const fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Size of the whole collection, when known.
    #[must_use]
    pub const fn total_items(&self) -> Option<u64> {
        self.total_items
    }

    /// Number of pages in the whole collection, when known.
    #[must_use]
    pub const fn total_pages(&self) -> Option<u64> {
        self.total_pages
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageMetaDto {
    page: u32,
    page_size: u32,
    total_items: Option<u64>,
    total_pages: Option<u64>,
}

impl From<PageMeta> for PageMetaDto {
    fn from(value: PageMeta) -> Self {
        Self {
            page: value.page,
            page_size: value.page_size,
            total_items: value.total_items,
            total_pages: value.total_pages,
        }
    }
}

impl TryFrom<PageMetaDto> for PageMeta {
    type Error = PageMetaError;

    fn try_from(value: PageMetaDto) -> Result<Self, Self::Error> {
        let PageMetaDto {
            page,
            page_size,
            total_items,
            total_pages: supplied_pages,
        } = value;

        if page < 1 {
            return Err(PageMetaError::PageOutOfRange);
        }
        if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
            return Err(PageMetaError::PageSizeOutOfRange);
        }
        if let (Some(items), Some(actual)) = (total_items, supplied_pages) {
            let expected = total_pages(items, page_size);
            if expected != actual {
                return Err(PageMetaError::InconsistentTotals { expected, actual });
            }
        }
        Ok(Self {
            page,
            page_size,
            total_items,
            total_pages: supplied_pages,
        })
    }
}
