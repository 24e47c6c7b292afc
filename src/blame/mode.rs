//! Blame mode selection.
//!
//! Precedence, highest first:
//! 1. `no_pagination` -> `Full`
//! 2. explicit `lines` -> `Range`
//! 3. `streaming` -> `Streaming`
//! 4. more lines than the threshold -> `Paginated(page or 1)`
//! 5. otherwise `Full`

use serde::{Deserialize, Serialize};

use crate::config::BlameConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "page", rename_all = "lowercase")]
pub enum BlameMode {
    Full,
    Paginated(u32),
    /// Progressive rendering; computed one page at a time.
    Streaming,
    /// Caller supplied the exact line span.
    Range,
}

/// How much of a file the caller wants blamed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct RangeRequest {
    #[serde(default)]
    pub no_pagination: bool,
    #[serde(default)]
    pub streaming: bool,
    pub page: Option<u32>,
    /// Inclusive `(start, end)` line span.
    pub lines: Option<(u32, u32)>,
}

impl RangeRequest {
    pub fn full() -> Self {
        Self {
            no_pagination: true,
            ..Default::default()
        }
    }

    pub fn page(page: u32) -> Self {
        Self {
            page: Some(page),
            ..Default::default()
        }
    }

    pub fn lines(start: u32, end: u32) -> Self {
        Self {
            lines: Some((start, end)),
            ..Default::default()
        }
    }
}

pub fn select_mode(total_lines: u32, request: &RangeRequest, config: &BlameConfig) -> BlameMode {
    if request.no_pagination {
        BlameMode::Full
    } else if request.lines.is_some() {
        BlameMode::Range
    } else if request.streaming {
        BlameMode::Streaming
    } else if total_lines > config.pagination_threshold {
        BlameMode::Paginated(request.page.unwrap_or(1))
    } else {
        BlameMode::Full
    }
}
