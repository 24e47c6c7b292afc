//! Folding per-line attribution into contiguous groups for display.

use serde::Serialize;

use super::engine::BlameEntry;
use super::types::RevisionId;

/// Run of adjacent lines attributed to the same revision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlameGroup {
    pub start: u32,
    pub end: u32,
    pub revision: RevisionId,
}

impl BlameGroup {
    pub fn line_count(&self) -> u32 {
        self.end - self.start + 1
    }
}

/// Group line-sorted entries. Equal revisions separated by other lines stay
/// in separate groups.
pub fn group_entries(entries: &[BlameEntry]) -> Vec<BlameGroup> {
    let mut groups: Vec<BlameGroup> = Vec::new();

    for entry in entries {
        match groups.last_mut() {
            Some(last) if last.revision == entry.revision && last.end + 1 == entry.line => {
                last.end = entry.line;
            }
            _ => groups.push(BlameGroup {
                start: entry.line,
                end: entry.line,
                revision: entry.revision.clone(),
            }),
        }
    }

    groups
}
