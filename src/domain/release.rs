use std::fmt;
use std::str::FromStr;

use crate::domain::prerelease;
use crate::domain::Version;
use crate::error::PromoteError;

/// Kind of version bump requested for a promotion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ReleaseKind {
    Major,
    Minor,
    Patch,
    #[default]
    Prerelease,
}

impl FromStr for ReleaseKind {
    type Err = PromoteError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "major" => Ok(ReleaseKind::Major),
            "minor" => Ok(ReleaseKind::Minor),
            "patch" => Ok(ReleaseKind::Patch),
            "prerelease" => Ok(ReleaseKind::Prerelease),
            other => Err(PromoteError::config(format!(
                "Unknown release type '{}': expected major, minor, patch or prerelease",
                other
            ))),
        }
    }
}

impl fmt::Display for ReleaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReleaseKind::Major => write!(f, "major"),
            ReleaseKind::Minor => write!(f, "minor"),
            ReleaseKind::Patch => write!(f, "patch"),
            ReleaseKind::Prerelease => write!(f, "prerelease"),
        }
    }
}

/// Which existing releases count towards a stage's current version
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseChannel {
    /// Release candidates only (`X.Y.Z-rc...`)
    Candidate,
    /// Final releases only (no pre-release label)
    Final,
}

impl ReleaseChannel {
    pub fn for_stage(prerelease: bool) -> Self {
        if prerelease {
            ReleaseChannel::Candidate
        } else {
            ReleaseChannel::Final
        }
    }

    pub fn admits(&self, version: &Version) -> bool {
        match self {
            ReleaseChannel::Candidate => prerelease::is_candidate(&version.pre),
            ReleaseChannel::Final => !version.is_prerelease(),
        }
    }
}

/// A release to be created in the hosting service
#[derive(Debug, Clone, PartialEq)]
pub struct ReleaseRecord {
    pub tag: Version,
    pub name: String,
    pub body: String,
    pub prerelease: bool,
    pub draft: bool,
    pub target: String,
}

impl ReleaseRecord {
    /// Draft release for a promoted destination branch, named "<destination> <version>"
    pub fn draft(destination: &str, tag: Version, body: impl Into<String>, prerelease: bool) -> Self {
        ReleaseRecord {
            name: format!("{} {}", destination, tag),
            tag,
            body: body.into(),
            prerelease,
            draft: true,
            target: destination.to_string(),
        }
    }
}

/// Identifier of a release created in the hosting service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseId {
    pub id: u64,
    pub html_url: Option<String>,
    /// HTTP status the creation was answered with
    pub status: u16,
}

impl fmt::Display for ReleaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.html_url {
            Some(url) => write!(f, "#{} ({})", self.id, url),
            None => write!(f, "#{}", self.id),
        }
    }
}
