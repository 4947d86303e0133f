use std::fmt;

use thiserror::Error;

use crate::domain::ReleaseKind;

/// Unified error type for git-promote operations
#[derive(Error, Debug)]
pub enum PromoteError {
    #[error("Git operation failed: {0}")]
    Git(#[from] git2::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Stage '{0}' is not configured in release_map")]
    UnknownStage(String),

    #[error("Credential error: {0}")]
    Credentials(String),

    #[error("Working tree contains changes to tracked files: {}", .paths.join(", "))]
    DirtyWorkingTree { paths: Vec<String> },

    #[error(
        "{} commit(s) present on {destination} but not on {source_branch}; run with --force to discard them:\n  {}",
        .commits.len(),
        .commits.join("\n  ")
    )]
    WouldDiscardCommits {
        source_branch: String,
        destination: String,
        commits: Vec<String>,
    },

    #[error("Malformed version tag '{tag}': {reason}")]
    MalformedVersionTag { tag: String, reason: String },

    #[error("Stage '{stage}' finalizes a release candidate and takes no release type (got '{kind}')")]
    InvalidBumpForStage { stage: String, kind: ReleaseKind },

    #[error("Failed to promote {source_branch} to {destination}: {reason}")]
    BranchPromotionFailure {
        source_branch: String,
        destination: String,
        reason: String,
    },

    #[error("Listing releases failed with HTTP {status}: {body}")]
    ReleaseListing { status: u16, body: String },

    #[error("Release creation failed with HTTP {status}: {body}")]
    PublishError { status: u16, body: String },

    #[error("Rollback of {destination} to {prior} failed: {reason}; original error: {original}")]
    RollbackFailure {
        destination: String,
        prior: String,
        reason: String,
        original: Box<PromoteError>,
    },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in git-promote
pub type Result<T> = std::result::Result<T, PromoteError>;

impl PromoteError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        PromoteError::Config(msg.into())
    }

    /// Create a credential error with context
    pub fn credentials(msg: impl Into<String>) -> Self {
        PromoteError::Credentials(msg.into())
    }

    /// Create a malformed tag error
    pub fn malformed_tag(tag: impl Into<String>, reason: impl Into<String>) -> Self {
        PromoteError::MalformedVersionTag {
            tag: tag.into(),
            reason: reason.into(),
        }
    }
}

/// Step of the promotion workflow at which a run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromotionStage {
    Validating,
    NotesComputed,
    VersionComputed,
    Promoting,
    Publishing,
}

impl fmt::Display for PromotionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PromotionStage::Validating => "validation",
            PromotionStage::NotesComputed => "release notes",
            PromotionStage::VersionComputed => "version resolution",
            PromotionStage::Promoting => "branch promotion",
            PromotionStage::Publishing => "release publishing",
        };
        f.write_str(name)
    }
}

/// A failed promotion run, tagged with the step that failed.
#[derive(Error, Debug)]
#[error("{stage} failed")]
pub struct PromotionFailure {
    pub stage: PromotionStage,
    #[source]
    pub source: PromoteError,
}

impl PromotionFailure {
    pub fn at(stage: PromotionStage) -> impl FnOnce(PromoteError) -> Self {
        move |source| PromotionFailure { stage, source }
    }

    /// Whether the destination branch was rewritten and a rollback attempted.
    pub fn rolled_back(&self) -> bool {
        self.stage == PromotionStage::Publishing
    }
}
