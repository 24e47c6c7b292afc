use git2::Oid;
use std::collections::HashMap;
use std::path::Path;

use super::files::TreeFiles;
use super::history::GitHistory;
use super::repository::{commit_to_info, resolve_commit, GitRepository};
use crate::blame::{Blamer, IgnoreList, RangeRequest, RevisionId, SourceBlob};
use crate::config::BlameConfig;
use crate::error::{AppError, Result};
use crate::models::{BlameGroupInfo, BlameResponse, CommitInfo};

impl GitRepository {
    /// Blame `path` as of `commit` (HEAD when `None`).
    ///
    /// A broken ignore-revs file does not fail the request: blame runs
    /// without ignoring anything and the problem is reported in
    /// `ignore_revs_error`.
    pub fn get_blame(
        &self,
        path: &str,
        commit: Option<&str>,
        request: &RangeRequest,
        ignore_revs: bool,
        config: &BlameConfig,
    ) -> Result<BlameResponse> {
        self.with_repo(|repo| {
            let commit = resolve_commit(repo, commit)?;
            let tree = commit.tree()?;

            let entry = tree
                .get_path(Path::new(path))
                .map_err(|_| AppError::PathNotFound(path.to_string()))?;
            let obj = entry.to_object(repo)?;
            let blob = obj
                .as_blob()
                .ok_or_else(|| AppError::InvalidPath(format!("{} is not a file", path)))?;
            let source = SourceBlob::from_bytes(blob.content());

            let history = GitHistory::new(repo, path);
            let files = TreeFiles::new(repo, tree.clone());
            let blamer = Blamer::new(&history, &files, *config);
            let plan = blamer.plan(&source, request)?;

            let (ignore, ignore_revs_error) = match IgnoreList::load(&files, ignore_revs) {
                Ok(list) => (list, None),
                Err(e) => {
                    tracing::warn!("Ignoring nothing for {}: {}", path, e);
                    (IgnoreList::empty(), Some(e.to_string()))
                }
            };
            if !ignore.is_empty() {
                tracing::debug!("Skipping {} ignored revisions ({:?})", ignore.len(), ignore.source());
            }

            let revision = RevisionId::from(commit.id());
            let groups = blamer.blame_planned(&source, &revision, &plan, &ignore)?;

            let mut commits: HashMap<RevisionId, CommitInfo> = HashMap::new();
            let mut infos = Vec::with_capacity(groups.len());
            for group in groups {
                let info = match commits.get(&group.revision) {
                    Some(info) => info.clone(),
                    None => {
                        let oid = Oid::from_str(group.revision.as_str())?;
                        let info = commit_to_info(&repo.find_commit(oid)?);
                        commits.insert(group.revision.clone(), info.clone());
                        info
                    }
                };
                infos.push(BlameGroupInfo {
                    start_line: group.start,
                    end_line: group.end,
                    line_count: group.line_count(),
                    commit: info,
                });
            }

            Ok(BlameResponse {
                path: path.to_string(),
                commit: commit.id().to_string(),
                mode: plan.mode,
                page: plan.page,
                total_pages: plan.total_pages,
                start_line: plan.range.start,
                end_line: plan.range.end,
                total_lines: plan.range.total,
                groups: infos,
                ignore_revs_error,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blame::ignore_list::IGNORE_REVS_FILE;
    use crate::blame::{BlameError, BlameMode};
    use crate::git::test_support::{create_commit, init_temp_repo};
    use git2::Repository;
    use pretty_assertions::assert_eq;

    const SOURCE: &str = "fn a() {}\nfn b() { 1 }\nfn c() {}\n";

    /// root writes three lines, `feature` edits line 2, `format` reformats
    /// line 2, then the format commit is listed in the ignore file.
    /// Returns (root, feature, format).
    fn formatting_history(repo: &Repository) -> (Oid, Oid, Oid) {
        let root = create_commit(repo, "root", &[("src/lib.rs", "fn a() {}\nfn b() {}\nfn c() {}\n")], None);
        let feature = create_commit(
            repo,
            "feature",
            &[("src/lib.rs", SOURCE)],
            Some(&repo.find_commit(root).unwrap()),
        );
        let format = create_commit(
            repo,
            "format",
            &[("src/lib.rs", "fn a() {}\nfn b() {  1  }\nfn c() {}\n")],
            Some(&repo.find_commit(feature).unwrap()),
        );
        let ignore = format!("# rustfmt\n{format}\n");
        create_commit(
            repo,
            "ignore formatting",
            &[(IGNORE_REVS_FILE, ignore.as_str())],
            Some(&repo.find_commit(format).unwrap()),
        );
        (root, feature, format)
    }

    fn owners(response: &BlameResponse) -> Vec<(u32, u32, String)> {
        response
            .groups
            .iter()
            .map(|g| (g.start_line, g.end_line, g.commit.oid.clone()))
            .collect()
    }

    #[test]
    fn test_ignored_formatting_commit() {
        let (dir, repo) = init_temp_repo();
        let (root, feature, format) = formatting_history(&repo);
        let git = GitRepository::open(dir.path()).unwrap();
        let config = BlameConfig::default();

        let response = git
            .get_blame("src/lib.rs", None, &RangeRequest::default(), true, &config)
            .unwrap();
        assert_eq!(response.mode, BlameMode::Full);
        assert_eq!(response.total_lines, 3);
        assert_eq!(response.ignore_revs_error, None);
        assert_eq!(
            owners(&response),
            vec![
                (1, 1, root.to_string()),
                (2, 2, feature.to_string()),
                (3, 3, root.to_string()),
            ]
        );
        assert_eq!(response.groups[1].commit.summary, "feature");

        let plain = git
            .get_blame("src/lib.rs", None, &RangeRequest::default(), false, &config)
            .unwrap();
        assert_eq!(plain.groups[1].commit.oid, format.to_string());
    }

    #[test]
    fn test_malformed_ignore_file_falls_back() {
        let (dir, repo) = init_temp_repo();
        let root = create_commit(&repo, "root", &[("a.txt", "one\ntwo\n")], None);
        create_commit(
            &repo,
            "bad ignores",
            &[(IGNORE_REVS_FILE, "# ok\nnot-a-sha\n")],
            Some(&repo.find_commit(root).unwrap()),
        );
        let git = GitRepository::open(dir.path()).unwrap();

        let response = git
            .get_blame("a.txt", None, &RangeRequest::default(), true, &BlameConfig::default())
            .unwrap();
        assert!(response.ignore_revs_error.as_deref().unwrap().contains("line 2"));
        assert_eq!(owners(&response), vec![(1, 2, root.to_string())]);
    }

    #[test]
    fn test_paginated_blame_clamps_page() {
        let (dir, repo) = init_temp_repo();
        create_commit(&repo, "root", &[("a.txt", "1\n2\n3\n4\n5\n")], None);
        let git = GitRepository::open(dir.path()).unwrap();
        let config = BlameConfig {
            page_size: 2,
            pagination_threshold: 3,
        };

        let first = git
            .get_blame("a.txt", None, &RangeRequest::default(), false, &config)
            .unwrap();
        assert_eq!(first.mode, BlameMode::Paginated(1));
        assert_eq!((first.start_line, first.end_line, first.total_pages), (1, 2, 3));

        let last = git
            .get_blame("a.txt", None, &RangeRequest::page(9), false, &config)
            .unwrap();
        assert_eq!(last.page, Some(3));
        assert_eq!((last.start_line, last.end_line), (5, 5));
        assert_eq!(last.groups[0].line_count, 1);
    }

    #[test]
    fn test_blame_at_older_commit() {
        let (dir, repo) = init_temp_repo();
        let (root, _, _) = formatting_history(&repo);
        let git = GitRepository::open(dir.path()).unwrap();

        let response = git
            .get_blame(
                "src/lib.rs",
                Some(&root.to_string()),
                &RangeRequest::default(),
                true,
                &BlameConfig::default(),
            )
            .unwrap();
        assert_eq!(response.commit, root.to_string());
        assert_eq!(owners(&response), vec![(1, 3, root.to_string())]);
    }

    #[test]
    fn test_binary_and_missing_files() {
        let (dir, repo) = init_temp_repo();
        create_commit(&repo, "root", &[("logo.png", "PNG\0\u{1}"), ("src/a.rs", "x\n")], None);
        let git = GitRepository::open(dir.path()).unwrap();
        let config = BlameConfig::default();
        let request = RangeRequest::default();

        assert!(matches!(
            git.get_blame("logo.png", None, &request, false, &config),
            Err(AppError::Blame(BlameError::BinaryBlob))
        ));
        assert!(matches!(
            git.get_blame("missing.rs", None, &request, false, &config),
            Err(AppError::PathNotFound(_))
        ));
        assert!(matches!(
            git.get_blame("src", None, &request, false, &config),
            Err(AppError::InvalidPath(_))
        ));
        assert!(matches!(
            git.get_blame("src/a.rs", Some("nothex"), &request, false, &config),
            Err(AppError::CommitNotFound(_))
        ));
    }
}
