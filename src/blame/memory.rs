//! In-memory [`History`] for tests and for callers that already hold a
//! file's touch map.
//!
//! Each revision records which of its lines it changed. Lines keep their
//! numbers across revisions unless a revision marks them as introduced,
//! in which case they have no counterpart in its parents.

use std::collections::{BTreeSet, HashMap};

use super::engine::{History, Touch};
use super::error::HistoryError;
use super::types::{LineSpan, RevisionId};

#[derive(Debug, Default, Clone)]
struct MemoryRevision {
    parents: Vec<RevisionId>,
    touched: BTreeSet<u32>,
    introduced: BTreeSet<u32>,
}

#[derive(Debug, Default, Clone)]
pub struct MemoryHistory {
    revisions: HashMap<RevisionId, MemoryRevision>,
}

impl MemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `id` with its parents and the lines it changed.
    pub fn commit(&mut self, id: &str, parents: &[&str], touched: &[u32]) -> &mut Self {
        self.revisions.insert(
            RevisionId::new(id),
            MemoryRevision {
                parents: parents.iter().map(|p| RevisionId::new(*p)).collect(),
                touched: touched.iter().copied().collect(),
                introduced: BTreeSet::new(),
            },
        );
        self
    }

    /// Mark `line` as newly added by `id`. Also counts as a touch.
    pub fn introduce(&mut self, id: &str, line: u32) -> &mut Self {
        if let Some(revision) = self.revisions.get_mut(&RevisionId::new(id)) {
            revision.touched.insert(line);
            revision.introduced.insert(line);
        }
        self
    }

    fn get(&self, id: &RevisionId) -> Result<&MemoryRevision, HistoryError> {
        self.revisions
            .get(id)
            .ok_or_else(|| HistoryError::UnknownRevision(id.clone()))
    }
}

impl History for MemoryHistory {
    fn last_touching_revision(
        &self,
        revision: &RevisionId,
        span: LineSpan,
    ) -> Result<Option<Touch>, HistoryError> {
        let mut current = revision.clone();

        loop {
            let entry = self.get(&current)?;
            if entry.touched.range(span.start..=span.end).next().is_some() {
                return Ok(Some(Touch { revision: current, span }));
            }

            // Unchanged lines are inherited from the first parent.
            match entry.parents.first() {
                Some(parent) => current = parent.clone(),
                None if current == *revision => return Ok(None),
                None => return Ok(Some(Touch { revision: current, span })),
            }
        }
    }

    fn parents(&self, revision: &RevisionId) -> Result<Vec<RevisionId>, HistoryError> {
        Ok(self.get(revision)?.parents.clone())
    }

    fn map_to_parent(
        &self,
        revision: &RevisionId,
        _parent: &RevisionId,
        span: LineSpan,
    ) -> Result<Option<LineSpan>, HistoryError> {
        let entry = self.get(revision)?;
        if entry.introduced.range(span.start..=span.end).next().is_some() {
            Ok(None)
        } else {
            Ok(Some(span))
        }
    }
}
