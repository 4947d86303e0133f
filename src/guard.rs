//! Preconditions checked before any remote state is touched.

use crate::boundary::BoundaryWarning;
use crate::error::{PromoteError, Result};
use crate::git::{remote_branch, Repository};

pub struct RepositoryStateGuard<'a, R: Repository> {
    repo: &'a R,
    remote: &'a str,
}

impl<'a, R: Repository> RepositoryStateGuard<'a, R> {
    pub fn new(repo: &'a R, remote: &'a str) -> Self {
        RepositoryStateGuard { repo, remote }
    }

    /// Fail on uncommitted changes to tracked files.
    ///
    /// `--force` does not apply here: the checkout is switched during the
    /// promotion and local edits would be at risk.
    pub fn check_working_tree_clean(&self) -> Result<()> {
        let paths = self.repo.dirty_paths()?;
        if paths.is_empty() {
            tracing::debug!("working tree clean");
            Ok(())
        } else {
            tracing::warn!(count = paths.len(), "working tree has changes to tracked files");
            Err(PromoteError::DirtyWorkingTree { paths })
        }
    }

    /// Check that promoting `source` onto `destination` drops no commits.
    ///
    /// Commits reachable from the destination but not the source are fatal
    /// unless `force` is set, in which case they come back as a warning and
    /// will be unreachable from the destination after the promotion.
    pub fn check_no_lost_commits(
        &self,
        source: &str,
        destination: &str,
        force: bool,
    ) -> Result<Option<BoundaryWarning>> {
        let lost = self.repo.commits_missing_from(
            &remote_branch(self.remote, source),
            &remote_branch(self.remote, destination),
        )?;

        if lost.is_empty() {
            return Ok(None);
        }

        let commits: Vec<String> = lost.iter().map(|c| c.oneline()).collect();
        if force {
            tracing::warn!(destination, count = commits.len(), "discarding commits (forced)");
            Ok(Some(BoundaryWarning::CommitsWillBeDiscarded {
                destination: destination.to_string(),
                commits,
            }))
        } else {
            Err(PromoteError::WouldDiscardCommits {
                source_branch: source.to_string(),
                destination: destination.to_string(),
                commits,
            })
        }
    }
}
