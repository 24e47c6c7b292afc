//! Line ranges and page arithmetic.
//!
//! Page requests never fail: a page below 1 or past the end is clamped so a
//! stale page link still lands on real lines. Explicit line ranges are
//! validated instead.

use std::ops::RangeInclusive;

use serde::Serialize;

use super::error::BlameError;

/// Inclusive 1-based span of lines to blame within a blob of `total` lines.
///
/// Only an empty blob yields an empty range (`start == 1`, `end == 0`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BlameRange {
    pub start: u32,
    pub end: u32,
    pub total: u32,
}

impl BlameRange {
    pub fn full(total: u32) -> Self {
        Self {
            start: 1,
            end: total,
            total,
        }
    }

    /// Range covered by page `page` of size `page_size`, clamping the page.
    pub fn for_page(page: u32, page_size: u32, total: u32) -> Self {
        let page_size = page_size.max(1);
        let page = clamp_page(page, total_pages(total, page_size));

        let start = (page - 1) * page_size + 1;
        let end = page.saturating_mul(page_size).min(total);

        Self { start, end, total }
    }

    /// Caller-chosen range; must lie within `[1, total]`.
    pub fn explicit(start: u32, end: u32, total: u32) -> Result<Self, BlameError> {
        if start < 1 || start > end || end > total {
            return Err(BlameError::RangeOutOfBounds { start, end, total });
        }
        Ok(Self { start, end, total })
    }

    pub fn lines(&self) -> RangeInclusive<u32> {
        self.start..=self.end
    }

    pub fn len(&self) -> u32 {
        (self.end + 1).saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end < self.start
    }
}

/// `ceil(total / page_size)`; zero for an empty blob.
pub fn total_pages(total: u32, page_size: u32) -> u32 {
    total.div_ceil(page_size.max(1))
}

/// Clamp a requested page into `1..=total_pages` (page 1 when there are none).
pub fn clamp_page(page: u32, total_pages: u32) -> u32 {
    page.clamp(1, total_pages.max(1))
}
