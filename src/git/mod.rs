//! Git operations abstraction layer
//!
//! This module provides a trait-based abstraction over the git operations a
//! promotion needs, allowing the orchestration logic to run against a real
//! repository or an in-memory mock.
//!
//! # Overview
//!
//! - [repository::Git2Repository]: A real implementation using the `git2` crate
//! - [mock::MockRepository]: A mock implementation for testing
//!
//! Revisions are plain revspecs (`origin/staging`, a full hash, ...). Use
//! [remote_branch] to name a remote-tracking branch.
//!
//! ```rust
//! # use git_promote::git::{remote_branch, Repository};
//! # fn example<R: Repository>(repo: &R) -> git_promote::Result<()> {
//! repo.fetch("origin", &["integration", "staging"])?;
//! let lost = repo.commits_missing_from(
//!     &remote_branch("origin", "integration"),
//!     &remote_branch("origin", "staging"),
//! )?;
//! # Ok(())
//! # }
//! ```

pub mod mock;
pub mod repository;

pub use mock::MockRepository;
pub use repository::Git2Repository;

use crate::error::Result;
use git2::Oid;

/// Commit information shown to the operator
#[derive(Debug, Clone, PartialEq)]
pub struct CommitInfo {
    /// The commit hash (full)
    pub hash: String,
    /// First line of the commit message
    pub summary: String,
    /// The commit author
    pub author: String,
}

impl CommitInfo {
    /// `<short hash> <summary>`, like `git log --oneline`
    pub fn oneline(&self) -> String {
        format!("{} {}", crate::ui::short_hash(&self.hash), self.summary)
    }
}

/// Revspec of a remote-tracking branch, e.g. `origin/staging`
pub fn remote_branch(remote: &str, branch: &str) -> String {
    format!("{}/{}", remote, branch)
}

/// Git operations used by a promotion.
///
/// ## Error Handling
///
/// All methods return [crate::error::Result<T>]. Implementations map
/// underlying errors (like `git2::Error`) to [crate::error::PromoteError].
pub trait Repository {
    /// Fetch the given branches from a remote into `refs/remotes/<remote>/*`.
    fn fetch(&self, remote: &str, branches: &[&str]) -> Result<()>;

    /// Paths of tracked files with uncommitted changes (index or worktree).
    ///
    /// Untracked files are ignored, including untracked content inside a
    /// submodule. A submodule whose checked-out commit moved is dirty.
    fn dirty_paths(&self) -> Result<Vec<String>>;

    /// Resolve a revision to a commit id, `Ok(None)` if it does not exist.
    fn resolve(&self, revision: &str) -> Result<Option<Oid>>;

    /// Commits reachable from `tip` but not from `base`, newest first.
    fn commits_missing_from(&self, base: &str, tip: &str) -> Result<Vec<CommitInfo>>;

    /// Summaries of commits on either side of `left...right` but not both,
    /// oldest first.
    fn subjects_between(&self, left: &str, right: &str) -> Result<Vec<String>>;

    /// Check out `target` detached, point local `branch` at it and check the
    /// branch out.
    fn reset_branch(&self, branch: &str, target: Oid) -> Result<()>;

    /// Push local `branch` to the remote, overwriting its history.
    fn force_push(&self, remote: &str, branch: &str) -> Result<()>;
}
