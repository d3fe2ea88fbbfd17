//! Integration tests for the Git interface.
//!
//! These tests use real git repositories created via tempfile, with a bare
//! repository standing in for the remote.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

use shipyard::git::{Git, GitError};

/// A working repository with a bare "origin".
struct TestRepo {
    _root: TempDir,
    work: PathBuf,
    remote: PathBuf,
}

impl TestRepo {
    /// Create an empty bare remote and a working repo on `master` with one
    /// commit, not yet pushed.
    fn new() -> Self {
        let root = TempDir::new().expect("failed to create temp dir");
        let remote = root.path().join("remote.git");
        let work = root.path().join("work");
        fs::create_dir_all(&work).unwrap();

        run_git(root.path(), &["init", "--bare", "-b", "master", "remote.git"]);
        run_git(&work, &["init", "-b", "master"]);
        configure_identity(&work);
        run_git(&work, &["remote", "add", "origin", remote.to_str().unwrap()]);

        fs::write(work.join("README.md"), "# Test Repo\n").unwrap();
        run_git(&work, &["add", "README.md"]);
        run_git(&work, &["commit", "-m", "Initial commit"]);

        Self {
            _root: root,
            work,
            remote,
        }
    }

    fn git(&self) -> Git {
        Git::open(&self.work).expect("failed to open test repo")
    }

    fn write(&self, path: &str, content: &str) {
        fs::write(self.work.join(path), content).unwrap();
    }

    /// Clone the remote into a second working copy.
    fn clone_remote(&self, name: &str) -> PathBuf {
        let parent = self.work.parent().unwrap();
        run_git(
            parent,
            &["clone", self.remote.to_str().unwrap(), name],
        );
        let path = parent.join(name);
        configure_identity(&path);
        path
    }
}

fn configure_identity(dir: &Path) {
    run_git(dir, &["config", "user.email", "test@example.com"]);
    run_git(dir, &["config", "user.name", "Test User"]);
}

/// Run a git command in the given directory.
fn run_git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("git command failed");

    if !output.status.success() {
        panic!(
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
    }
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

mod status {
    use super::*;

    #[test]
    fn clean_after_commit() {
        let repo = TestRepo::new();
        let status = repo.git().worktree_status().unwrap();
        assert!(!status.has_pending());
        assert!(!status.has_conflicts());
    }

    #[test]
    fn counts_untracked_and_modified() {
        let repo = TestRepo::new();
        repo.write("README.md", "changed\n");
        repo.write("new.txt", "new\n");
        let status = repo.git().worktree_status().unwrap();
        assert_eq!(status.unstaged, 1);
        assert_eq!(status.untracked, 1);
        assert!(status.has_pending());
    }

    #[test]
    fn add_all_and_commit() {
        let repo = TestRepo::new();
        repo.write("new.txt", "new\n");
        let git = repo.git();
        git.add_all().unwrap();
        assert_eq!(git.worktree_status().unwrap().staged, 1);
        git.commit("add new").unwrap();
        assert!(!git.worktree_status().unwrap().has_pending());
        assert_eq!(run_git(&repo.work, &["log", "-1", "--format=%s"]), "add new");
    }

    #[test]
    fn open_rejects_non_repo() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            Git::open(dir.path()),
            Err(GitError::NotARepo { .. })
        ));
    }
}

mod branches {
    use super::*;

    #[test]
    fn checkout_new_and_back() {
        let repo = TestRepo::new();
        let git = repo.git();
        assert_eq!(git.current_branch().unwrap().as_deref(), Some("master"));

        git.checkout_new("dev/1.0.0").unwrap();
        assert_eq!(git.current_branch().unwrap().as_deref(), Some("dev/1.0.0"));
        assert!(git.local_branch_exists("dev/1.0.0"));

        git.checkout("master").unwrap();
        assert_eq!(
            git.local_branches().unwrap(),
            vec!["dev/1.0.0".to_string(), "master".to_string()]
        );
    }

    #[test]
    fn merge_and_delete_merged_branch() {
        let repo = TestRepo::new();
        let git = repo.git();
        git.checkout_new("dev/1.0.0").unwrap();
        repo.write("feature.txt", "feature\n");
        git.add_all().unwrap();
        git.commit("feature").unwrap();

        git.checkout("master").unwrap();
        git.merge("dev/1.0.0").unwrap();
        assert!(repo.work.join("feature.txt").exists());

        git.delete_local_branch("dev/1.0.0").unwrap();
        assert!(!git.local_branch_exists("dev/1.0.0"));
    }

    #[test]
    fn unmerged_branch_is_not_deleted() {
        let repo = TestRepo::new();
        let git = repo.git();
        git.checkout_new("dev/2.0.0").unwrap();
        repo.write("wip.txt", "wip\n");
        git.add_all().unwrap();
        git.commit("wip").unwrap();
        git.checkout("master").unwrap();

        assert!(matches!(
            git.delete_local_branch("dev/2.0.0"),
            Err(GitError::CommandFailed { .. })
        ));
    }

    #[test]
    fn stash_round_trip() {
        let repo = TestRepo::new();
        let git = repo.git();
        assert!(git.stash_list().unwrap().is_empty());

        repo.write("README.md", "stashed\n");
        run_git(&repo.work, &["stash"]);
        assert_eq!(git.stash_list().unwrap().len(), 1);
        assert!(!git.worktree_status().unwrap().has_pending());

        git.stash_pop().unwrap();
        assert!(git.stash_list().unwrap().is_empty());
        assert_eq!(
            fs::read_to_string(repo.work.join("README.md")).unwrap(),
            "stashed\n"
        );
    }
}

mod remote {
    use super::*;

    #[test]
    fn push_and_list_remote_refs() {
        let repo = TestRepo::new();
        let git = repo.git();
        assert!(git.ls_remote_refs("origin").unwrap().is_empty());
        assert!(!git.remote_branch_exists("origin", "master").unwrap());

        git.push("origin", "master").unwrap();
        assert!(git.remote_branch_exists("origin", "master").unwrap());
        assert_eq!(
            git.ls_remote_refs("origin").unwrap(),
            vec!["refs/heads/master".to_string()]
        );
    }

    #[test]
    fn tags_are_pushed_and_deleted() {
        let repo = TestRepo::new();
        let git = repo.git();
        git.push("origin", "master").unwrap();

        git.tag("release/1.0.0").unwrap();
        assert!(git.local_tag_exists("release/1.0.0"));
        git.push_tags("origin").unwrap();
        assert!(git
            .ls_remote_refs("origin")
            .unwrap()
            .contains(&"refs/tags/release/1.0.0".to_string()));

        git.delete_remote_ref("origin", "refs/tags/release/1.0.0").unwrap();
        git.delete_local_tag("release/1.0.0").unwrap();
        git.delete_local_tag("release/1.0.0").unwrap();
        assert!(!git.local_tag_exists("release/1.0.0"));
        assert!(!git
            .ls_remote_refs("origin")
            .unwrap()
            .iter()
            .any(|r| r.starts_with("refs/tags/")));
    }

    #[test]
    fn pull_brings_in_remote_work() {
        let repo = TestRepo::new();
        let git = repo.git();
        git.push("origin", "master").unwrap();

        let other = repo.clone_remote("other");
        fs::write(other.join("other.txt"), "from other\n").unwrap();
        run_git(&other, &["add", "other.txt"]);
        run_git(&other, &["commit", "-m", "other"]);
        run_git(&other, &["push", "origin", "master"]);

        git.pull("origin", "master", false).unwrap();
        assert!(repo.work.join("other.txt").exists());
    }

    #[test]
    fn conflicting_pull_reports_conflicted_paths() {
        let repo = TestRepo::new();
        let git = repo.git();
        git.push("origin", "master").unwrap();

        let other = repo.clone_remote("other");
        fs::write(other.join("README.md"), "theirs\n").unwrap();
        run_git(&other, &["commit", "-am", "theirs"]);
        run_git(&other, &["push", "origin", "master"]);

        repo.write("README.md", "ours\n");
        git.add_all().unwrap();
        git.commit("ours").unwrap();

        match git.pull("origin", "master", false) {
            Err(GitError::Conflicts { paths }) => assert_eq!(paths, vec!["README.md"]),
            other => panic!("expected conflicts, got {:?}", other),
        }
        assert!(git.worktree_status().unwrap().has_conflicts());
    }

    #[test]
    fn unrelated_histories_need_the_flag() {
        let repo = TestRepo::new();
        repo.git().push("origin", "master").unwrap();

        let fresh = repo.work.parent().unwrap().join("fresh");
        fs::create_dir_all(&fresh).unwrap();
        let git = Git::init(&fresh, "master").unwrap();
        configure_identity(&fresh);
        git.add_remote("origin", repo.remote.to_str().unwrap()).unwrap();
        fs::write(fresh.join("package.json"), "{}\n").unwrap();
        git.add_all().unwrap();
        git.commit("init").unwrap();

        assert!(git.pull("origin", "master", false).is_err());
        git.pull("origin", "master", true).unwrap();
        assert!(fresh.join("README.md").exists());
        assert!(fresh.join("package.json").exists());
    }
}
