use std::fmt;
use std::str::FromStr;

use semver::Prerelease;

use crate::domain::prerelease;
use crate::domain::ReleaseKind;
use crate::error::{PromoteError, Result};

/// Semantic version of a release tag.
///
/// Field order matters: the derived ordering compares major, minor, patch and
/// then the pre-release label, where an empty label sorts above any non-empty
/// one (`1.2.0-rc.3 < 1.2.0`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub pre: Prerelease,
}

impl Version {
    /// Create a final (non pre-release) version
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Version {
            major,
            minor,
            patch,
            pre: Prerelease::EMPTY,
        }
    }

    /// The baseline used when no release exists yet
    pub fn zero() -> Self {
        Version::new(0, 0, 0)
    }

    /// Same version with the given pre-release label
    pub fn with_pre(&self, label: &str) -> Result<Self> {
        let pre = Prerelease::new(label).map_err(|e| {
            PromoteError::malformed_tag(format!("{}-{}", self, label), e.to_string())
        })?;
        Ok(Version { pre, ..self.clone() })
    }

    /// Parse a release tag (e.g., "v1.2.3-rc.1" -> Version(1,2,3,rc.1))
    ///
    /// A leading `v` or `V` is accepted. Build metadata is rejected: release
    /// tags must compare unambiguously.
    pub fn parse(tag: &str) -> Result<Self> {
        let clean_tag = tag.trim().trim_start_matches(['v', 'V']);

        let parsed = semver::Version::parse(clean_tag)
            .map_err(|e| PromoteError::malformed_tag(tag, e.to_string()))?;

        if !parsed.build.is_empty() {
            return Err(PromoteError::malformed_tag(
                tag,
                "build metadata is not allowed in release tags",
            ));
        }

        Ok(Version {
            major: parsed.major,
            minor: parsed.minor,
            patch: parsed.patch,
            pre: parsed.pre,
        })
    }

    pub fn is_prerelease(&self) -> bool {
        !self.pre.is_empty()
    }

    /// Strip the pre-release label, keeping major.minor.patch
    pub fn finalize(&self) -> Self {
        Version::new(self.major, self.minor, self.patch)
    }

    /// Bump exactly one component according to the release kind.
    ///
    /// Numeric bumps drop any pre-release label; a `prerelease` bump keeps
    /// major.minor.patch and increments the label's trailing counter.
    pub fn bump(&self, kind: ReleaseKind) -> Result<Self> {
        let next = |component: u64, name: &str| {
            component.checked_add(1).ok_or_else(|| {
                PromoteError::malformed_tag(self.to_string(), format!("{} version is out of range", name))
            })
        };

        let bumped = match kind {
            ReleaseKind::Major => Version::new(next(self.major, "major")?, 0, 0),
            ReleaseKind::Minor => Version::new(self.major, next(self.minor, "minor")?, 0),
            ReleaseKind::Patch => Version::new(self.major, self.minor, next(self.patch, "patch")?),
            ReleaseKind::Prerelease => Version {
                pre: prerelease::increment(&self.pre)?,
                ..self.clone()
            },
        };
        Ok(bumped)
    }

    /// Bump and make sure the result is a release candidate.
    ///
    /// `patch` on `1.2.0` gives `1.2.1-rc.0`; `prerelease` on `1.2.0-rc.0`
    /// gives `1.2.0-rc.1`.
    pub fn next_candidate(&self, kind: ReleaseKind) -> Result<Self> {
        let bumped = self.bump(kind)?;
        if bumped.is_prerelease() {
            Ok(bumped)
        } else {
            Ok(Version {
                pre: prerelease::first_candidate(),
                ..bumped
            })
        }
    }
}

impl FromStr for Version {
    type Err = PromoteError;

    fn from_str(s: &str) -> Result<Self> {
        Version::parse(s)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if !self.pre.is_empty() {
            write!(f, "-{}", self.pre)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn test_version_parse() {
        let version = v("v1.2.3");
        assert_eq!(version.major, 1);
        assert_eq!(version.minor, 2);
        assert_eq!(version.patch, 3);
        assert!(!version.is_prerelease());
    }

    #[test]
    fn test_version_parse_prerelease() {
        let version = v("1.2.0-rc.3");
        assert_eq!(version.pre.as_str(), "rc.3");
        assert_eq!(version.to_string(), "1.2.0-rc.3");
    }

    #[test]
    fn test_version_parse_uppercase_v() {
        assert_eq!(v("V1.2.3"), Version::new(1, 2, 3));
    }

    #[test]
    fn test_version_parse_invalid() {
        assert!(Version::parse("1.2").is_err());
        assert!(Version::parse("v1.2.3.4").is_err());
        assert!(Version::parse("release-1").is_err());
        assert!(Version::parse("1.2.3+build.5").is_err());
        assert!(matches!(
            Version::parse("nope"),
            Err(PromoteError::MalformedVersionTag { .. })
        ));
    }

    #[test]
    fn test_final_sorts_above_prerelease() {
        assert!(v("1.2.0") > v("1.2.0-rc.9"));
        assert!(v("1.2.0-rc.10") > v("1.2.0-rc.9"));
        assert!(v("1.2.1-rc.0") > v("1.2.0"));
    }

    #[test]
    fn test_finalize_strips_only_label() {
        assert_eq!(v("1.2.0-rc.3").finalize(), v("1.2.0"));
        assert_eq!(v("1.2.0").finalize(), v("1.2.0"));
    }

    #[test]
    fn test_bump_components() {
        let version = v("1.2.3-rc.1");
        assert_eq!(version.bump(ReleaseKind::Major).unwrap(), v("2.0.0"));
        assert_eq!(version.bump(ReleaseKind::Minor).unwrap(), v("1.3.0"));
        assert_eq!(version.bump(ReleaseKind::Patch).unwrap(), v("1.2.4"));
        assert_eq!(version.bump(ReleaseKind::Prerelease).unwrap(), v("1.2.3-rc.2"));
    }

    #[test]
    fn test_bump_overflow_is_error() {
        let max = u64::MAX;
        let huge = v(&format!("{}.{}.{}", max, max, max));
        for kind in [ReleaseKind::Major, ReleaseKind::Minor, ReleaseKind::Patch] {
            assert!(matches!(
                huge.bump(kind),
                Err(PromoteError::MalformedVersionTag { .. })
            ));
        }
        assert!(v("1.0.0-rc.18446744073709551615")
            .next_candidate(ReleaseKind::Prerelease)
            .is_err());
    }

    #[test]
    fn test_next_candidate_attaches_rc() {
        assert_eq!(
            v("1.2.0").next_candidate(ReleaseKind::Patch).unwrap(),
            v("1.2.1-rc.0")
        );
        assert_eq!(
            v("1.2.0-rc.4").next_candidate(ReleaseKind::Minor).unwrap(),
            v("1.3.0-rc.0")
        );
    }

    #[test]
    fn test_next_candidate_increments_rc() {
        assert_eq!(
            v("1.2.0-rc.0").next_candidate(ReleaseKind::Prerelease).unwrap(),
            v("1.2.0-rc.1")
        );
    }

    #[test]
    fn test_next_candidate_from_zero_baseline() {
        assert_eq!(
            Version::zero().next_candidate(ReleaseKind::Prerelease).unwrap(),
            v("0.0.0-rc.0")
        );
        assert_eq!(
            Version::zero().next_candidate(ReleaseKind::Minor).unwrap(),
            v("0.1.0-rc.0")
        );
    }

    #[test]
    fn test_next_candidate_is_monotonic() {
        let currents = ["0.1.0-rc.0", "1.0.0-rc.9", "1.2.3-rc.1", "2.0.0-rc", "1.1.0"];
        let kinds = [
            ReleaseKind::Major,
            ReleaseKind::Minor,
            ReleaseKind::Patch,
        ];
        for current in currents {
            for kind in kinds {
                let next = v(current).next_candidate(kind).unwrap();
                assert!(next > v(current), "{} -> {} ({})", current, next, kind);
            }
            if v(current).is_prerelease() {
                let next = v(current).next_candidate(ReleaseKind::Prerelease).unwrap();
                assert!(next > v(current), "{} -> {}", current, next);
            }
        }
    }

    #[test]
    fn test_with_pre() {
        assert_eq!(Version::new(1, 0, 0).with_pre("rc.2").unwrap(), v("1.0.0-rc.2"));
        assert!(Version::new(1, 0, 0).with_pre("rc..2").is_err());
    }
}
