//! Core value types shared by every stage of a blame computation.
//!
//! - `RevisionId`: opaque, hashable revision identifier
//! - `LineSpan`: inclusive, 1-based span of lines in one revision's file
//! - `SourceBlob`: the file content being blamed

use std::fmt;

use serde::{Deserialize, Serialize};

/// Number of leading bytes inspected when sniffing for binary content.
const BINARY_SNIFF_LEN: usize = 8000;

/// Opaque revision identifier.
///
/// The engine only compares and hashes these. Parsing a hex object id (as
/// the ignore-revs file requires) goes through [`RevisionId::parse_hex`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RevisionId(String);

impl RevisionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Parse a full hex object id: 40 digits (SHA-1) or 64 digits (SHA-256).
    ///
    /// Hex digits are accepted in either case and normalized to lowercase.
    pub fn parse_hex(token: &str) -> Option<Self> {
        let valid_len = token.len() == 40 || token.len() == 64;
        if valid_len && token.bytes().all(|b| b.is_ascii_hexdigit()) {
            Some(Self(token.to_ascii_lowercase()))
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RevisionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RevisionId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<git2::Oid> for RevisionId {
    fn from(oid: git2::Oid) -> Self {
        Self(oid.to_string())
    }
}

/// Inclusive span of 1-based line numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LineSpan {
    pub start: u32,
    pub end: u32,
}

impl LineSpan {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    pub fn line(line: u32) -> Self {
        Self { start: line, end: line }
    }

    pub fn len(&self) -> u32 {
        self.end + 1 - self.start
    }

    pub fn contains(&self, line: u32) -> bool {
        self.start <= line && line <= self.end
    }
}

/// File content at a revision, reduced to what blame needs.
#[derive(Debug, Clone)]
pub struct SourceBlob {
    line_count: u32,
    binary: bool,
}

impl SourceBlob {
    /// Build a blob from raw bytes.
    ///
    /// Content with a NUL byte in its first 8000 bytes is flagged binary and
    /// counts no lines, matching git's own text/binary heuristic.
    pub fn from_bytes(data: &[u8]) -> Self {
        let sniff = &data[..data.len().min(BINARY_SNIFF_LEN)];
        if sniff.contains(&0) {
            return Self {
                line_count: 0,
                binary: true,
            };
        }

        Self::from_text(&String::from_utf8_lossy(data))
    }

    pub fn from_text(text: &str) -> Self {
        Self {
            line_count: text.lines().count() as u32,
            binary: false,
        }
    }

    pub fn line_count(&self) -> u32 {
        self.line_count
    }

    pub fn is_binary(&self) -> bool {
        self.binary
    }
}
