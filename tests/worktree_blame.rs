//! Blame through the public library API, with the ignore list read from a
//! work tree on disk instead of a commit.

use std::path::Path;

use blame_viewer::blame::ignore_list::IGNORE_REVS_FILE;
use blame_viewer::blame::{Blamer, DirectoryFiles, IgnoreSource, RangeRequest, RevisionId, SourceBlob};
use blame_viewer::config::BlameConfig;
use blame_viewer::git::GitHistory;
use git2::{Commit, Oid, Repository};
use pretty_assertions::assert_eq;

fn commit_file(repo: &Repository, path: &str, content: &str, message: &str, parent: Option<&Commit>) -> Oid {
    std::fs::write(repo.workdir().unwrap().join(path), content).unwrap();
    let mut index = repo.index().unwrap();
    index.add_path(Path::new(path)).unwrap();
    index.write().unwrap();
    let tree = repo.find_tree(index.write_tree().unwrap()).unwrap();
    let sig = git2::Signature::now("Test User", "test@example.com").unwrap();
    let parents: Vec<&Commit> = parent.into_iter().collect();
    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents).unwrap()
}

#[test]
fn test_worktree_ignore_file_skips_reformat() {
    let dir = tempfile::tempdir().unwrap();
    let repo = Repository::init(dir.path()).unwrap();

    let root = commit_file(&repo, "notes.md", "alpha\nbeta\ngamma\n", "root", None);
    let reformat = commit_file(
        &repo,
        "notes.md",
        "alpha\nBETA\ngamma\n",
        "reformat",
        Some(&repo.find_commit(root).unwrap()),
    );

    // Uncommitted ignore file: only the work tree knows about it.
    std::fs::write(dir.path().join(IGNORE_REVS_FILE), format!("{reformat}  # case change\n")).unwrap();

    let history = GitHistory::new(&repo, "notes.md");
    let files = DirectoryFiles::new(dir.path());
    let blamer = Blamer::new(&history, &files, BlameConfig::default());
    let blob = SourceBlob::from_text("alpha\nBETA\ngamma\n");
    let tip = RevisionId::from(reformat);

    let plan = blamer.plan(&blob, &RangeRequest::default()).unwrap();
    let ignore = blame_viewer::blame::IgnoreList::load(&files, true).unwrap();
    assert!(matches!(ignore.source(), IgnoreSource::File(_)));

    let groups = blamer.blame_planned(&blob, &tip, &plan, &ignore).unwrap();
    assert_eq!(groups.len(), 1);
    assert_eq!((groups[0].start, groups[0].end), (1, 3));
    assert_eq!(groups[0].revision, RevisionId::from(root));

    let plain = blamer
        .compute_blame(&blob, &tip, &RangeRequest::default(), false)
        .unwrap();
    assert_eq!(plain.len(), 3);
    assert_eq!(plain[1].revision, tip);
}
