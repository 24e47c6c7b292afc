//! Blame data transfer objects.
//!
//! Attribution for a file at one commit, folded into runs of consecutive
//! lines that share a commit.

use serde::Serialize;

use crate::blame::BlameMode;
use crate::models::CommitInfo;

/// Response for a blame request on a file at a specific commit.
#[derive(Debug, Serialize)]
pub struct BlameResponse {
    /// Path of the file
    pub path: String,
    /// Commit OID where blame was calculated
    pub commit: String,
    pub mode: BlameMode,
    /// Page returned, for paginated and streaming modes
    pub page: Option<u32>,
    pub total_pages: u32,
    /// First line covered (1-indexed)
    pub start_line: u32,
    /// Last line covered; below `start_line` for an empty file
    pub end_line: u32,
    pub total_lines: u32,
    pub groups: Vec<BlameGroupInfo>,
    /// Set when the ignore-revs file could not be used and blame ran without it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignore_revs_error: Option<String>,
}

/// Consecutive lines attributed to the same commit.
#[derive(Debug, Serialize)]
pub struct BlameGroupInfo {
    pub start_line: u32,
    pub end_line: u32,
    pub line_count: u32,
    pub commit: CommitInfo,
}
