//! Ignore-revs loading and parsing.
//!
//! Reads the repository's `.git-blame-ignore-revs` file, the same format git
//! reads through `blame.ignoreRevsFile`:
//! - text after `#` is a comment; blank lines are skipped
//! - every other line is exactly one full hex object id
//!
//! A single bad line rejects the whole file. A missing file means nothing is
//! ignored. An unreadable file and a path that is not a regular file are
//! reported separately from a malformed one.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::types::RevisionId;

/// Well-known ignore file, resolved from the repository root.
pub const IGNORE_REVS_FILE: &str = ".git-blame-ignore-revs";

#[derive(Error, Debug)]
pub enum IgnoreListError {
    #[error("malformed ignore revisions file: line {line_number} is not a revision id: {content:?}")]
    Malformed { line_number: usize, content: String },

    #[error("ignore revisions path {path} is a {kind}, not a file")]
    NotAFile { path: PathBuf, kind: &'static str },

    #[error("could not read ignore revisions file {path}: {source}")]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// What a path resolves to in a repository snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileObject {
    /// A regular file and its bytes.
    Regular(Vec<u8>),
    /// Anything else: directory, symlink, submodule. Carries a short label.
    Other(&'static str),
}

/// Read access to files at the point the ignore list is resolved from.
pub trait FileAccess {
    /// `Ok(None)` when nothing exists at `path`.
    fn read_file_at(&self, path: &Path) -> io::Result<Option<FileObject>>;
}

/// [`FileAccess`] rooted at a directory on disk (e.g. a work tree).
#[derive(Debug, Clone)]
pub struct DirectoryFiles {
    root: PathBuf,
}

impl DirectoryFiles {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl FileAccess for DirectoryFiles {
    fn read_file_at(&self, path: &Path) -> io::Result<Option<FileObject>> {
        let full_path = self.root.join(path);

        // symlink_metadata so a link is reported as such instead of followed
        let metadata = match fs::symlink_metadata(&full_path) {
            Ok(m) => m,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };

        let file_type = metadata.file_type();
        let object = if file_type.is_file() {
            FileObject::Regular(fs::read(&full_path)?)
        } else if file_type.is_dir() {
            FileObject::Other("directory")
        } else if file_type.is_symlink() {
            FileObject::Other("symlink")
        } else {
            FileObject::Other("special file")
        };

        Ok(Some(object))
    }
}

/// Where an [`IgnoreList`] came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IgnoreSource {
    /// Built directly by the caller, or ignoring was switched off.
    Explicit,
    /// Parsed from this file.
    File(PathBuf),
    /// Ignoring was requested but no file exists at this path.
    Missing(PathBuf),
}

/// Set of revisions excluded from attribution.
#[derive(Debug, Clone)]
pub struct IgnoreList {
    revisions: HashSet<RevisionId>,
    source: IgnoreSource,
}

impl IgnoreList {
    pub fn empty() -> Self {
        Self {
            revisions: HashSet::new(),
            source: IgnoreSource::Explicit,
        }
    }

    /// Load the ignore list for a blame request.
    ///
    /// With `enabled == false` no file is touched.
    pub fn load<F: FileAccess + ?Sized>(files: &F, enabled: bool) -> Result<Self, IgnoreListError> {
        if !enabled {
            return Ok(Self::empty());
        }

        let path = PathBuf::from(IGNORE_REVS_FILE);
        let object = files
            .read_file_at(&path)
            .map_err(|source| IgnoreListError::Unreadable {
                path: path.clone(),
                source,
            })?;

        match object {
            None => {
                tracing::debug!("No {} found, nothing to ignore", IGNORE_REVS_FILE);
                Ok(Self {
                    revisions: HashSet::new(),
                    source: IgnoreSource::Missing(path),
                })
            }
            Some(FileObject::Other(kind)) => Err(IgnoreListError::NotAFile { path, kind }),
            Some(FileObject::Regular(bytes)) => {
                let revisions = parse_ignore_revs(&String::from_utf8_lossy(&bytes))?;
                tracing::debug!("Loaded {} ignored revisions from {}", revisions.len(), path.display());
                Ok(Self {
                    revisions,
                    source: IgnoreSource::File(path),
                })
            }
        }
    }

    pub fn contains(&self, revision: &RevisionId) -> bool {
        self.revisions.contains(revision)
    }

    pub fn len(&self) -> usize {
        self.revisions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.revisions.is_empty()
    }

    pub fn source(&self) -> &IgnoreSource {
        &self.source
    }
}

impl FromIterator<RevisionId> for IgnoreList {
    fn from_iter<I: IntoIterator<Item = RevisionId>>(iter: I) -> Self {
        Self {
            revisions: iter.into_iter().collect(),
            source: IgnoreSource::Explicit,
        }
    }
}

/// Parse ignore-revs file content. Fails on the first invalid line.
pub fn parse_ignore_revs(text: &str) -> Result<HashSet<RevisionId>, IgnoreListError> {
    let mut revisions = HashSet::new();

    for (idx, raw_line) in text.lines().enumerate() {
        let line = match raw_line.find('#') {
            Some(pos) => &raw_line[..pos],
            None => raw_line,
        };
        let token = line.trim();
        if token.is_empty() {
            continue;
        }

        let revision = RevisionId::parse_hex(token).ok_or_else(|| IgnoreListError::Malformed {
            line_number: idx + 1,
            content: raw_line.to_string(),
        })?;
        revisions.insert(revision);
    }

    Ok(revisions)
}
