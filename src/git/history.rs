//! `History` backed by a git repository.
//!
//! "Who last touched this line" comes from libgit2 blame, run once per
//! starting commit and cached for the life of the request. Moving a line
//! into a parent's numbering uses a zero-context diff of the two blobs.

use git2::{BlameOptions, Blob, Commit, DiffOptions, ErrorCode, Oid, Patch, Repository};
use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;

use crate::blame::{History, HistoryError, LineSpan, RevisionId, Touch};

/// One libgit2 blame hunk, in the file as seen from the blamed commit.
#[derive(Debug, Clone, Copy)]
struct BlameHunkRecord {
    final_start: u32,
    lines: u32,
    commit: Oid,
    orig_start: u32,
}

impl BlameHunkRecord {
    fn contains(&self, line: u32) -> bool {
        self.final_start <= line && line < self.final_start + self.lines
    }
}

/// Old/new extent of one diff hunk, as in `@@ -old_start,old_lines +new_start,new_lines @@`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct HunkRange {
    pub old_start: u32,
    pub old_lines: u32,
    pub new_start: u32,
    pub new_lines: u32,
}

pub struct GitHistory<'r> {
    repo: &'r Repository,
    path: PathBuf,
    blames: RefCell<HashMap<Oid, Vec<BlameHunkRecord>>>,
}

impl<'r> GitHistory<'r> {
    pub fn new(repo: &'r Repository, path: impl Into<PathBuf>) -> Self {
        Self {
            repo,
            path: path.into(),
            blames: RefCell::new(HashMap::new()),
        }
    }

    fn commit(&self, revision: &RevisionId) -> Result<Commit<'r>, HistoryError> {
        let unknown = || HistoryError::UnknownRevision(revision.clone());
        let oid = Oid::from_str(revision.as_str()).map_err(|_| unknown())?;
        self.repo.find_commit(oid).map_err(|e| match e.code() {
            ErrorCode::NotFound => unknown(),
            _ => e.into(),
        })
    }

    fn blob_at(&self, commit: &Commit<'r>) -> Result<Option<Blob<'r>>, HistoryError> {
        let tree = commit.tree()?;
        let entry = match tree.get_path(&self.path) {
            Ok(entry) => entry,
            Err(e) if e.code() == ErrorCode::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(entry.to_object(self.repo)?.into_blob().ok())
    }

    fn hunk_for_line(&self, commit: Oid, line: u32) -> Result<Option<BlameHunkRecord>, HistoryError> {
        let cached = self.blames.borrow().contains_key(&commit);
        if !cached {
            let mut opts = BlameOptions::new();
            opts.newest_commit(commit);

            let blame = self.repo.blame_file(&self.path, Some(&mut opts))?;
            let hunks: Vec<BlameHunkRecord> = blame
                .iter()
                .map(|hunk| BlameHunkRecord {
                    final_start: hunk.final_start_line() as u32,
                    lines: hunk.lines_in_hunk() as u32,
                    commit: hunk.final_commit_id(),
                    orig_start: hunk.orig_start_line() as u32,
                })
                .collect();

            tracing::debug!("Blamed {} at {}: {} hunks", self.path.display(), commit, hunks.len());
            self.blames.borrow_mut().insert(commit, hunks);
        }

        Ok(self
            .blames
            .borrow()
            .get(&commit)
            .and_then(|hunks| hunks.iter().find(|h| h.contains(line)).copied()))
    }
}

impl History for GitHistory<'_> {
    fn last_touching_revision(
        &self,
        revision: &RevisionId,
        span: LineSpan,
    ) -> Result<Option<Touch>, HistoryError> {
        let commit = self.commit(revision)?;
        let hunk = self.hunk_for_line(commit.id(), span.start)?.ok_or_else(|| {
            HistoryError::Backend(format!(
                "line {} of {} not found at {}",
                span.start,
                self.path.display(),
                revision
            ))
        })?;

        let orig_start = hunk.orig_start + (span.start - hunk.final_start);
        Ok(Some(Touch {
            revision: RevisionId::from(hunk.commit),
            span: LineSpan::new(orig_start, orig_start + span.len() - 1),
        }))
    }

    fn parents(&self, revision: &RevisionId) -> Result<Vec<RevisionId>, HistoryError> {
        Ok(self.commit(revision)?.parent_ids().map(RevisionId::from).collect())
    }

    fn map_to_parent(
        &self,
        revision: &RevisionId,
        parent: &RevisionId,
        span: LineSpan,
    ) -> Result<Option<LineSpan>, HistoryError> {
        let (Some(new_blob), Some(old_blob)) = (
            self.blob_at(&self.commit(revision)?)?,
            self.blob_at(&self.commit(parent)?)?,
        ) else {
            return Ok(None);
        };

        let mut opts = DiffOptions::new();
        opts.context_lines(0);
        let patch = Patch::from_blobs(&old_blob, None, &new_blob, None, Some(&mut opts))?;

        let mut hunks = Vec::with_capacity(patch.num_hunks());
        for idx in 0..patch.num_hunks() {
            let (hunk, _) = patch.hunk(idx)?;
            hunks.push(HunkRange {
                old_start: hunk.old_start(),
                old_lines: hunk.old_lines(),
                new_start: hunk.new_start(),
                new_lines: hunk.new_lines(),
            });
        }

        match (map_line(&hunks, span.start), map_line(&hunks, span.end)) {
            (Some(start), Some(end)) => Ok(Some(LineSpan::new(start, end.max(start)))),
            _ => Ok(None),
        }
    }
}

/// Map a line of the new side of a zero-context diff onto the old side.
///
/// Lines outside hunks shift by the size change of the hunks above them.
/// Lines inside a replacement map proportionally onto the replaced lines.
/// Lines inside a pure insertion have no old counterpart.
pub(crate) fn map_line(hunks: &[HunkRange], line: u32) -> Option<u32> {
    let mut offset: i64 = 0;

    for hunk in hunks {
        if hunk.new_lines == 0 {
            // Pure deletion after new line `new_start`.
            if line > hunk.new_start {
                offset += i64::from(hunk.old_lines);
                continue;
            }
            break;
        }

        if line < hunk.new_start {
            break;
        }

        let new_end = hunk.new_start + hunk.new_lines - 1;
        if line <= new_end {
            if hunk.old_lines == 0 {
                return None;
            }
            let relative = u64::from(line - hunk.new_start) * u64::from(hunk.old_lines)
                / u64::from(hunk.new_lines);
            return Some(hunk.old_start + relative as u32);
        }

        offset += i64::from(hunk.old_lines) - i64::from(hunk.new_lines);
    }

    u32::try_from(i64::from(line) + offset).ok().filter(|l| *l >= 1)
}
