//! Line attribution engine.
//!
//! - `types`: revision ids, line spans, source blobs
//! - `ignore_list`: `.git-blame-ignore-revs` loading and parsing
//! - `mode`: full / paginated / streaming / explicit-range selection
//! - `range`: page arithmetic and range validation
//! - `engine`: ignore-aware history walk (`History` trait)
//! - `groups`: folding per-line results into contiguous groups
//! - `memory`: in-memory `History`
//!
//! [`Blamer`] runs the stages in order: select a mode, resolve the line
//! range, load the ignore list, walk history, group.

pub mod engine;
pub mod error;
pub mod groups;
pub mod ignore_list;
pub mod memory;
pub mod mode;
pub mod range;
pub mod types;

pub use engine::{BlameEntry, History, Touch};
pub use error::{BlameError, HistoryError};
pub use groups::{group_entries, BlameGroup};
pub use ignore_list::{DirectoryFiles, FileAccess, FileObject, IgnoreList, IgnoreListError, IgnoreSource};
pub use memory::MemoryHistory;
pub use mode::{select_mode, BlameMode, RangeRequest};
pub use range::BlameRange;
pub use types::{LineSpan, RevisionId, SourceBlob};

use serde::Serialize;

use crate::config::BlameConfig;

/// Resolved shape of one blame request, before any history is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BlamePlan {
    pub mode: BlameMode,
    pub range: BlameRange,
    /// Page being computed, for paginated and streaming modes.
    pub page: Option<u32>,
    pub total_pages: u32,
}

/// Blame computations over one file's history.
pub struct Blamer<'a, H: ?Sized, F: ?Sized> {
    history: &'a H,
    files: &'a F,
    config: BlameConfig,
}

impl<'a, H, F> Blamer<'a, H, F>
where
    H: History + ?Sized,
    F: FileAccess + ?Sized,
{
    pub fn new(history: &'a H, files: &'a F, config: BlameConfig) -> Self {
        Self {
            history,
            files,
            config,
        }
    }

    /// Decide mode and line range for `request` against `blob`.
    pub fn plan(&self, blob: &SourceBlob, request: &RangeRequest) -> Result<BlamePlan, BlameError> {
        if blob.is_binary() {
            return Err(BlameError::BinaryBlob);
        }

        let total = blob.line_count();
        let page_size = self.config.page_size;
        let total_pages = range::total_pages(total, page_size);

        let plan = match select_mode(total, request, &self.config) {
            BlameMode::Full => BlamePlan {
                mode: BlameMode::Full,
                range: BlameRange::full(total),
                page: None,
                total_pages,
            },
            BlameMode::Range => {
                let (start, end) = request.lines.unwrap_or((1, total));
                BlamePlan {
                    mode: BlameMode::Range,
                    range: BlameRange::explicit(start, end, total)?,
                    page: None,
                    total_pages,
                }
            }
            BlameMode::Paginated(requested) => {
                let page = range::clamp_page(requested, total_pages);
                BlamePlan {
                    mode: BlameMode::Paginated(page),
                    range: BlameRange::for_page(page, page_size, total),
                    page: Some(page),
                    total_pages,
                }
            }
            BlameMode::Streaming => {
                let page = range::clamp_page(request.page.unwrap_or(1), total_pages);
                BlamePlan {
                    mode: BlameMode::Streaming,
                    range: BlameRange::for_page(page, page_size, total),
                    page: Some(page),
                    total_pages,
                }
            }
        };

        tracing::debug!(
            "Blame plan: {:?}, lines {}-{} of {}",
            plan.mode,
            plan.range.start,
            plan.range.end,
            total
        );

        Ok(plan)
    }

    /// Blame the part of `blob` selected by `request`, as seen at `revision`.
    ///
    /// With `ignore_revisions` the repository's ignore-revs file is loaded
    /// and its revisions are skipped. Nothing is returned unless the whole
    /// range succeeds.
    pub fn compute_blame(
        &self,
        blob: &SourceBlob,
        revision: &RevisionId,
        request: &RangeRequest,
        ignore_revisions: bool,
    ) -> Result<Vec<BlameGroup>, BlameError> {
        let plan = self.plan(blob, request)?;
        let ignore = IgnoreList::load(self.files, ignore_revisions)?;
        self.blame_planned(blob, revision, &plan, &ignore)
    }

    /// Blame an already planned range with an already loaded ignore list.
    pub fn blame_planned(
        &self,
        blob: &SourceBlob,
        revision: &RevisionId,
        plan: &BlamePlan,
        ignore: &IgnoreList,
    ) -> Result<Vec<BlameGroup>, BlameError> {
        let entries = engine::blame_range(self.history, blob, revision, &plan.range, ignore)?;
        Ok(group_entries(&entries))
    }

    /// Page-by-page blame of the whole blob, sharing one ignore list.
    pub fn pages<'b>(
        &'b self,
        blob: &'b SourceBlob,
        revision: &'b RevisionId,
        ignore: &'b IgnoreList,
    ) -> BlamePages<'b, H> {
        BlamePages {
            history: self.history,
            blob,
            revision,
            ignore,
            page_size: self.config.page_size,
            next_page: 1,
            total_pages: range::total_pages(blob.line_count(), self.config.page_size),
        }
    }
}

/// One page of a streamed blame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlamePage {
    pub page: u32,
    pub range: BlameRange,
    pub groups: Vec<BlameGroup>,
}

/// Iterator returned by [`Blamer::pages`].
pub struct BlamePages<'b, H: ?Sized> {
    history: &'b H,
    blob: &'b SourceBlob,
    revision: &'b RevisionId,
    ignore: &'b IgnoreList,
    page_size: u32,
    next_page: u32,
    total_pages: u32,
}

impl<H: History + ?Sized> Iterator for BlamePages<'_, H> {
    type Item = Result<BlamePage, BlameError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next_page > self.total_pages {
            return None;
        }

        let page = self.next_page;
        self.next_page += 1;

        let range = BlameRange::for_page(page, self.page_size, self.blob.line_count());
        let result = engine::blame_range(self.history, self.blob, self.revision, &range, self.ignore)
            .map(|entries| BlamePage {
                page,
                range,
                groups: group_entries(&entries),
            });

        // A failed page ends the stream.
        if result.is_err() {
            self.next_page = self.total_pages + 1;
        }

        Some(result)
    }
}
