use std::path::PathBuf;

use crate::boundary::BoundaryWarning;
use crate::domain::{ReleaseId, ReleaseKind, Version};

/// The resolved intent of one promotion run
#[derive(Debug, Clone, PartialEq)]
pub struct PromotionRequest {
    /// Stage name as configured in `release_map`
    pub stage: String,

    /// Requested bump; `None` means the stage default
    pub release: Option<ReleaseKind>,

    /// Discard commits that only exist on the destination
    pub force: bool,

    /// Compute notes and version without touching the remote
    pub dry_run: bool,

    /// Where to also write the release notes
    pub release_notes: Option<PathBuf>,
}

impl PromotionRequest {
    pub fn new(stage: impl Into<String>) -> Self {
        PromotionRequest {
            stage: stage.into(),
            release: None,
            force: false,
            dry_run: false,
            release_notes: None,
        }
    }
}

/// Current and next version of a stage
#[derive(Debug, Clone, PartialEq)]
pub struct VersionPlan {
    pub current: Version,
    pub next: Version,
    /// `current` is the 0.0.0 baseline, not an existing release
    pub baseline: bool,
    pub warnings: Vec<BoundaryWarning>,
}

impl VersionPlan {
    /// Nothing new to release.
    ///
    /// A next version below an existing release counts as nothing to promote
    /// so a finalize with no newer candidate never mints an older release.
    pub fn is_noop(&self) -> bool {
        self.next == self.current || (!self.baseline && self.next < self.current)
    }
}

/// Terminal state of a successful run
#[derive(Debug, Clone, PartialEq)]
pub enum PromotionOutcome {
    Promoted {
        version: Version,
        notes: String,
        release: ReleaseId,
    },
    NothingToPromote {
        current: Version,
    },
    DryRunComplete {
        current: Version,
        next: Version,
        notes: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(current: &str, next: &str, baseline: bool) -> VersionPlan {
        VersionPlan {
            current: Version::parse(current).unwrap(),
            next: Version::parse(next).unwrap(),
            baseline,
            warnings: Vec::new(),
        }
    }

    #[test]
    fn test_equal_versions_are_noop() {
        assert!(plan("1.2.0", "1.2.0", false).is_noop());
    }

    #[test]
    fn test_higher_version_is_not_noop() {
        assert!(!plan("1.1.0", "1.2.0", false).is_noop());
    }

    #[test]
    fn test_lower_version_is_noop_unless_baseline() {
        assert!(plan("1.2.0", "0.0.0", false).is_noop());
        assert!(!plan("0.0.0", "0.0.0-rc.0", true).is_noop());
    }

    #[test]
    fn test_request_defaults() {
        let request = PromotionRequest::new("staging");
        assert_eq!(request.stage, "staging");
        assert_eq!(request.release, None);
        assert!(!request.force);
        assert!(!request.dry_run);
    }
}
