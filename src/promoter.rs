//! Moving a destination branch to its source's commit on the remote.

use git2::Oid;

use crate::error::{PromoteError, Result};
use crate::git::{remote_branch, Repository};

/// A destination branch rewritten on the remote, with what it pointed at before
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedPromotion {
    pub destination: String,
    pub prior: Oid,
    pub applied: Oid,
}

pub struct BranchPromoter<'a, R: Repository> {
    repo: &'a R,
    remote: &'a str,
}

impl<'a, R: Repository> BranchPromoter<'a, R> {
    pub fn new(repo: &'a R, remote: &'a str) -> Self {
        BranchPromoter { repo, remote }
    }

    /// Make `destination` on the remote identical to `source`.
    ///
    /// Both branches must exist on the remote. The destination's previous
    /// commit is recorded so the change can be undone with [Self::rollback].
    pub fn promote(&self, source: &str, destination: &str) -> Result<AppliedPromotion> {
        let failure = |reason: String| PromoteError::BranchPromotionFailure {
            source_branch: source.to_string(),
            destination: destination.to_string(),
            reason,
        };

        let source_ref = remote_branch(self.remote, source);
        let destination_ref = remote_branch(self.remote, destination);

        let applied = self
            .repo
            .resolve(&source_ref)?
            .ok_or_else(|| failure(format!("{} does not exist", source_ref)))?;
        let prior = self
            .repo
            .resolve(&destination_ref)?
            .ok_or_else(|| failure(format!("{} does not exist", destination_ref)))?;

        tracing::info!(%source_ref, %destination_ref, %prior, %applied, "promoting branch");

        self.repo
            .reset_branch(destination, applied)
            .and_then(|_| self.repo.force_push(self.remote, destination))
            .map_err(|e| failure(e.to_string()))?;

        Ok(AppliedPromotion {
            destination: destination.to_string(),
            prior,
            applied,
        })
    }

    /// Force the destination back to the commit it had before [Self::promote].
    pub fn rollback(&self, promotion: &AppliedPromotion) -> Result<()> {
        tracing::warn!(
            destination = %promotion.destination,
            prior = %promotion.prior,
            "rolling back branch"
        );
        self.repo
            .reset_branch(&promotion.destination, promotion.prior)?;
        self.repo.force_push(self.remote, &promotion.destination)
    }
}
