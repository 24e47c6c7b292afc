//! `FileAccess` over a commit's tree, so the ignore-revs file is read as of
//! the blamed commit rather than from the work tree.

use git2::{ErrorCode, FileMode, ObjectType, Repository, Tree};
use std::io;
use std::path::Path;

use crate::blame::{FileAccess, FileObject};

pub struct TreeFiles<'r> {
    repo: &'r Repository,
    tree: Tree<'r>,
}

impl<'r> TreeFiles<'r> {
    pub fn new(repo: &'r Repository, tree: Tree<'r>) -> Self {
        Self { repo, tree }
    }
}

impl FileAccess for TreeFiles<'_> {
    fn read_file_at(&self, path: &Path) -> io::Result<Option<FileObject>> {
        let entry = match self.tree.get_path(path) {
            Ok(entry) => entry,
            Err(e) if e.code() == ErrorCode::NotFound => return Ok(None),
            Err(e) => return Err(io::Error::other(e)),
        };

        let regular = [i32::from(FileMode::Blob), i32::from(FileMode::BlobExecutable)];
        let object = match entry.kind() {
            Some(ObjectType::Blob) if regular.contains(&entry.filemode()) => {
                let blob = self.repo.find_blob(entry.id()).map_err(io::Error::other)?;
                FileObject::Regular(blob.content().to_vec())
            }
            Some(ObjectType::Blob) => FileObject::Other("symlink"),
            Some(ObjectType::Tree) => FileObject::Other("directory"),
            Some(ObjectType::Commit) => FileObject::Other("submodule"),
            _ => FileObject::Other("unknown object"),
        };

        Ok(Some(object))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blame::ignore_list::IGNORE_REVS_FILE;
    use crate::blame::{IgnoreList, IgnoreListError};
    use crate::git::test_support::{create_commit, init_temp_repo};

    #[test]
    fn test_reads_regular_file_from_tree() {
        let (_dir, repo) = init_temp_repo();
        let oid = create_commit(&repo, "root", &[("notes.txt", "hello\n")], None);
        let files = TreeFiles::new(&repo, repo.find_commit(oid).unwrap().tree().unwrap());

        assert_eq!(
            files.read_file_at(Path::new("notes.txt")).unwrap(),
            Some(FileObject::Regular(b"hello\n".to_vec()))
        );
        assert_eq!(files.read_file_at(Path::new("missing.txt")).unwrap(), None);
    }

    #[test]
    fn test_directory_is_not_a_file() {
        let (_dir, repo) = init_temp_repo();
        let path = format!("{IGNORE_REVS_FILE}/inner");
        let oid = create_commit(&repo, "root", &[(path.as_str(), "x\n")], None);
        let files = TreeFiles::new(&repo, repo.find_commit(oid).unwrap().tree().unwrap());

        assert!(matches!(
            IgnoreList::load(&files, true),
            Err(IgnoreListError::NotAFile { kind: "directory", .. })
        ));
    }

    #[test]
    fn test_reads_ignore_file_as_of_commit() {
        let (_dir, repo) = init_temp_repo();
        let sha = "0123456789abcdef0123456789abcdef01234567";
        let first = create_commit(&repo, "no ignores", &[("f.txt", "a\n")], None);
        let first_commit = repo.find_commit(first).unwrap();
        let second = create_commit(&repo, "ignores", &[(IGNORE_REVS_FILE, sha)], Some(&first_commit));

        let at_first = TreeFiles::new(&repo, first_commit.tree().unwrap());
        assert!(IgnoreList::load(&at_first, true).unwrap().is_empty());

        let at_second = TreeFiles::new(&repo, repo.find_commit(second).unwrap().tree().unwrap());
        let list = IgnoreList::load(&at_second, true).unwrap();
        assert_eq!(list.len(), 1);
    }
}
