use thiserror::Error;

use super::ignore_list::IgnoreListError;
use super::types::RevisionId;

/// Failure reported by a [`History`](super::engine::History) backend.
#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("unknown revision: {0}")]
    UnknownRevision(RevisionId),

    #[error("history backend error: {0}")]
    Backend(String),
}

impl From<git2::Error> for HistoryError {
    fn from(e: git2::Error) -> Self {
        HistoryError::Backend(e.message().to_string())
    }
}

#[derive(Error, Debug)]
pub enum BlameError {
    #[error(transparent)]
    IgnoreList(#[from] IgnoreListError),

    #[error("cannot blame a binary file")]
    BinaryBlob,

    #[error("line range {start}-{end} is outside the file (1-{total})")]
    RangeOutOfBounds { start: u32, end: u32, total: u32 },

    #[error("history produced no attribution for line {line}")]
    Unattributed { line: u32 },

    #[error(transparent)]
    History(#[from] HistoryError),
}
