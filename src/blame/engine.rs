//! Ignore-aware line attribution.
//!
//! The history backend answers one question: which revision last touched
//! this span, looking back from a given revision. When the answer is an
//! ignored revision the line is mapped into that revision's parents and
//! the question is asked again from there. The walk uses an explicit
//! worklist so its depth is bounded by history, not by the call stack.

use std::collections::HashSet;

use serde::Serialize;

use super::error::{BlameError, HistoryError};
use super::ignore_list::IgnoreList;
use super::range::BlameRange;
use super::types::{LineSpan, RevisionId, SourceBlob};

/// Answer to a "who last touched this span" query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Touch {
    /// Revision that last changed the span.
    pub revision: RevisionId,
    /// Where the span sits in `revision`'s copy of the file.
    pub span: LineSpan,
}

/// Read-only view of one file's revision history.
pub trait History {
    /// Most recent revision at or before `revision` that touched `span`.
    ///
    /// `None` is only valid when `revision` is a root with no earlier touch;
    /// the root itself is then the answer.
    fn last_touching_revision(
        &self,
        revision: &RevisionId,
        span: LineSpan,
    ) -> Result<Option<Touch>, HistoryError>;

    /// Parents in order; empty for a root.
    fn parents(&self, revision: &RevisionId) -> Result<Vec<RevisionId>, HistoryError>;

    /// Position of `span` (numbered as in `revision`) within `parent`.
    ///
    /// `None` when the lines have no counterpart in `parent`, i.e. `revision`
    /// introduced them.
    fn map_to_parent(
        &self,
        revision: &RevisionId,
        parent: &RevisionId,
        span: LineSpan,
    ) -> Result<Option<LineSpan>, HistoryError> {
        let _ = (revision, parent);
        Ok(Some(span))
    }
}

/// Attribution of a single line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlameEntry {
    pub line: u32,
    pub revision: RevisionId,
    /// Ignored revisions skipped on the way to `revision`.
    pub depth: u32,
}

/// Pending query: look back from `revision` for `span`.
#[derive(Debug)]
struct Candidate {
    revision: RevisionId,
    span: LineSpan,
    depth: u32,
}

/// Blame every line of `range`, returning entries sorted by line.
pub fn blame_range<H: History + ?Sized>(
    history: &H,
    blob: &SourceBlob,
    start: &RevisionId,
    range: &BlameRange,
    ignore: &IgnoreList,
) -> Result<Vec<BlameEntry>, BlameError> {
    if blob.is_binary() {
        return Err(BlameError::BinaryBlob);
    }
    let total = blob.line_count();
    let empty = range.start == 1 && range.end == 0;
    let in_bounds = range.start >= 1 && range.start <= range.end && range.end <= total;
    if range.total != total || !(empty || in_bounds) {
        return Err(BlameError::RangeOutOfBounds {
            start: range.start,
            end: range.end,
            total,
        });
    }

    let mut entries = range
        .lines()
        .map(|line| attribute_line(history, start, line, ignore))
        .collect::<Result<Vec<_>, _>>()?;
    entries.sort_by_key(|e| e.line);

    tracing::debug!(
        "Blamed lines {}-{} at {} ({} ignored revisions)",
        range.start,
        range.end,
        start,
        ignore.len()
    );

    Ok(entries)
}

fn attribute_line<H: History + ?Sized>(
    history: &H,
    start: &RevisionId,
    line: u32,
    ignore: &IgnoreList,
) -> Result<BlameEntry, BlameError> {
    let mut worklist = vec![Candidate {
        revision: start.clone(),
        span: LineSpan::line(line),
        depth: 0,
    }];
    let mut seen: HashSet<(RevisionId, LineSpan)> = HashSet::new();
    // Oldest ignored revision reached whose lines go no further back.
    let mut fallback: Option<(RevisionId, u32)> = None;

    while let Some(candidate) = worklist.pop() {
        if !seen.insert((candidate.revision.clone(), candidate.span)) {
            continue;
        }

        let touch = history
            .last_touching_revision(&candidate.revision, candidate.span)?
            .unwrap_or(Touch {
                revision: candidate.revision,
                span: candidate.span,
            });

        if !ignore.contains(&touch.revision) {
            return Ok(BlameEntry {
                line,
                revision: touch.revision,
                depth: candidate.depth,
            });
        }

        let mut next = Vec::new();
        for parent in history.parents(&touch.revision)? {
            if let Some(span) = history.map_to_parent(&touch.revision, &parent, touch.span)? {
                next.push(Candidate {
                    revision: parent,
                    span,
                    depth: candidate.depth + 1,
                });
            }
        }

        if next.is_empty() {
            tracing::debug!(
                "Line {} only touched by ignored revisions, keeping {}",
                line,
                touch.revision
            );
            fallback.get_or_insert((touch.revision, candidate.depth));
        }

        // First parent is explored first.
        worklist.extend(next.into_iter().rev());
    }

    match fallback {
        Some((revision, depth)) => Ok(BlameEntry {
            line,
            revision,
            depth,
        }),
        None => Err(BlameError::Unattributed { line }),
    }
}
