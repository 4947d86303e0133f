use std::fmt;

/// Warnings raised while validating or resolving a promotion.
/// These are non-fatal issues that should be reported to the user.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryWarning {
    /// Commits only on the destination that a forced promotion will drop
    CommitsWillBeDiscarded {
        destination: String,
        commits: Vec<String>,
    },
    /// Release tag that cannot be parsed as a semantic version
    UnparsableTag { tag: String, reason: String },
}

impl fmt::Display for BoundaryWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryWarning::CommitsWillBeDiscarded {
                destination,
                commits,
            } => {
                writeln!(
                    f,
                    "{} commit(s) will be overwritten on '{}' and discarded:",
                    commits.len(),
                    destination
                )?;
                for commit in commits {
                    writeln!(f, "  {}", commit)?;
                }
                Ok(())
            }
            BoundaryWarning::UnparsableTag { tag, reason } => {
                write!(f, "Skipping release tag '{}': {}", tag, reason)
            }
        }
    }
}
