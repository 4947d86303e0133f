//! Current and next version of a stage, derived from the hosting service's
//! release list.
//!
//! The remote release list is the only state consulted: resolving twice
//! against an unchanged list gives the same plan.

use crate::boundary::BoundaryWarning;
use crate::config::{Config, StageConfig};
use crate::domain::{PromotionRequest, ReleaseChannel, Version, VersionPlan};
use crate::error::{PromoteError, Result};
use crate::github::{ReleaseApi, RemoteRelease};

/// Highest release in a channel, plus warnings for tags that do not parse
pub fn latest_in_channel(
    releases: &[RemoteRelease],
    channel: ReleaseChannel,
) -> (Option<Version>, Vec<BoundaryWarning>) {
    let mut warnings = Vec::new();
    let mut latest: Option<Version> = None;

    for release in releases {
        let version = match Version::parse(&release.tag_name) {
            Ok(version) => version,
            Err(PromoteError::MalformedVersionTag { tag, reason }) => {
                tracing::warn!(%tag, %reason, "skipping malformed release tag");
                warnings.push(BoundaryWarning::UnparsableTag { tag, reason });
                continue;
            }
            Err(e) => {
                tracing::warn!(tag = %release.tag_name, error = %e, "skipping release tag");
                continue;
            }
        };

        if channel.admits(&version) && latest.as_ref().map_or(true, |l| version > *l) {
            latest = Some(version);
        }
    }

    (latest, warnings)
}

/// Reject a bump kind on a stage that finalizes release candidates
pub fn ensure_bump_allowed(request: &PromotionRequest, stage: &StageConfig) -> Result<()> {
    match (stage.finalizes(), request.release) {
        (true, Some(kind)) => Err(PromoteError::InvalidBumpForStage {
            stage: request.stage.clone(),
            kind,
        }),
        _ => Ok(()),
    }
}

pub struct VersionResolver<'a, A: ReleaseApi> {
    api: &'a A,
    repository: &'a str,
}

impl<'a, A: ReleaseApi> VersionResolver<'a, A> {
    /// Resolver for `repository` (`owner/name`)
    pub fn new(api: &'a A, repository: &'a str) -> Self {
        VersionResolver { api, repository }
    }

    /// Highest release counted by the stage, or 0.0.0 when there is none
    pub fn current_version(&self, stage: &StageConfig) -> Result<Version> {
        let releases = self.api.list_releases(self.repository)?;
        let (latest, _) = latest_in_channel(&releases, stage.channel());
        Ok(latest.unwrap_or_else(Version::zero))
    }

    /// Version the requested promotion would release.
    ///
    /// A finalizing stage takes the latest candidate of the stage it promotes
    /// from and strips its label. Any other stage bumps its own current
    /// version (default `prerelease`) and makes it a release candidate.
    pub fn next_version(&self, config: &Config, request: &PromotionRequest) -> Result<VersionPlan> {
        let stage = config.stage(&request.stage)?;
        ensure_bump_allowed(request, stage)?;

        let releases = self.api.list_releases(self.repository)?;
        let (latest, warnings) = latest_in_channel(&releases, stage.channel());
        let baseline = latest.is_none();
        let current = latest.unwrap_or_else(Version::zero);

        let next = match &stage.promotes_from {
            Some(prior_name) => {
                let prior = config.stage(prior_name)?;
                let (candidate, _) = latest_in_channel(&releases, prior.channel());
                match candidate {
                    Some(candidate) => {
                        tracing::debug!(%candidate, from = %prior_name, "finalizing release candidate");
                        candidate.finalize()
                    }
                    None => {
                        tracing::warn!(from = %prior_name, "no release candidate to finalize");
                        current.clone()
                    }
                }
            }
            None => {
                let kind = request.release.unwrap_or_default();
                tracing::debug!(%current, %kind, "bumping version");
                current.next_candidate(kind)?
            }
        };

        Ok(VersionPlan {
            current,
            next,
            baseline,
            warnings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CredentialsConfig, StageConfig};
    use crate::domain::ReleaseKind;
    use crate::github::MockReleaseApi;
    use std::collections::BTreeMap;

    fn pipeline() -> Config {
        let mut release_map = BTreeMap::new();
        release_map.insert(
            "staging".to_string(),
            StageConfig {
                source: "integration".to_string(),
                destination: "staging".to_string(),
                prerelease: true,
                promotes_from: None,
            },
        );
        release_map.insert(
            "prod".to_string(),
            StageConfig {
                source: "staging".to_string(),
                destination: "prod".to_string(),
                prerelease: false,
                promotes_from: Some("staging".to_string()),
            },
        );
        Config {
            repository: "acme/api".to_string(),
            release_map,
            remote: "origin".to_string(),
            api_url: "https://api.github.com".to_string(),
            credentials: CredentialsConfig::default(),
        }
    }

    fn request(stage: &str, release: Option<ReleaseKind>) -> PromotionRequest {
        PromotionRequest {
            release,
            ..PromotionRequest::new(stage)
        }
    }

    fn v(s: &str) -> Version {
        Version::parse(s).unwrap()
    }

    #[test]
    fn test_current_version_per_stage() {
        let config = pipeline();
        let api = MockReleaseApi::with_tags(&["1.0.0", "1.1.0-rc.0", "1.1.0-rc.1"]);
        let resolver = VersionResolver::new(&api, "acme/api");

        let staging = resolver.current_version(config.stage("staging").unwrap()).unwrap();
        let prod = resolver.current_version(config.stage("prod").unwrap()).unwrap();

        assert_eq!(staging, v("1.1.0-rc.1"));
        assert_eq!(prod, v("1.0.0"));
    }

    #[test]
    fn test_current_version_defaults_to_zero() {
        let config = pipeline();
        let api = MockReleaseApi::new();
        let resolver = VersionResolver::new(&api, "acme/api");

        let staging = resolver.current_version(config.stage("staging").unwrap()).unwrap();
        assert_eq!(staging, Version::zero());
    }

    #[test]
    fn test_malformed_tags_are_skipped() {
        let releases: Vec<RemoteRelease> = ["nightly", "1.0.0", "v2.0", "1.1.0-rc.2"]
            .iter()
            .map(|t| RemoteRelease::tagged(*t))
            .collect();

        let (latest, warnings) = latest_in_channel(&releases, ReleaseChannel::Candidate);

        assert_eq!(latest, Some(v("1.1.0-rc.2")));
        assert_eq!(warnings.len(), 2);
        assert!(matches!(
            &warnings[0],
            BoundaryWarning::UnparsableTag { tag, .. } if tag == "nightly"
        ));
    }

    #[test]
    fn test_non_rc_prereleases_ignored_for_candidates() {
        let releases: Vec<RemoteRelease> = ["2.0.0-beta.1", "1.1.0-rc.2"]
            .iter()
            .map(|t| RemoteRelease::tagged(*t))
            .collect();

        let (latest, _) = latest_in_channel(&releases, ReleaseChannel::Candidate);
        assert_eq!(latest, Some(v("1.1.0-rc.2")));
    }

    #[test]
    fn test_next_prerelease_increments_candidate() {
        let config = pipeline();
        let api = MockReleaseApi::with_tags(&["1.0.0", "1.2.0-rc.0"]);
        let resolver = VersionResolver::new(&api, "acme/api");

        let plan = resolver.next_version(&config, &request("staging", None)).unwrap();

        assert_eq!(plan.current, v("1.2.0-rc.0"));
        assert_eq!(plan.next, v("1.2.0-rc.1"));
        assert!(!plan.is_noop());
    }

    #[test]
    fn test_next_patch_attaches_candidate() {
        let config = pipeline();
        let api = MockReleaseApi::with_tags(&["1.2.0-rc.3"]);
        let resolver = VersionResolver::new(&api, "acme/api");

        let plan = resolver
            .next_version(&config, &request("staging", Some(ReleaseKind::Patch)))
            .unwrap();

        assert_eq!(plan.next, v("1.2.1-rc.0"));
    }

    #[test]
    fn test_next_from_empty_release_list() {
        let config = pipeline();
        let api = MockReleaseApi::new();
        let resolver = VersionResolver::new(&api, "acme/api");

        let plan = resolver
            .next_version(&config, &request("staging", Some(ReleaseKind::Minor)))
            .unwrap();

        assert!(plan.baseline);
        assert_eq!(plan.current, Version::zero());
        assert_eq!(plan.next, v("0.1.0-rc.0"));
        assert!(!plan.is_noop());
    }

    #[test]
    fn test_finalize_strips_label() {
        let config = pipeline();
        let api = MockReleaseApi::with_tags(&["1.1.0", "1.2.0-rc.2", "1.2.0-rc.3"]);
        let resolver = VersionResolver::new(&api, "acme/api");

        let plan = resolver.next_version(&config, &request("prod", None)).unwrap();

        assert_eq!(plan.current, v("1.1.0"));
        assert_eq!(plan.next, v("1.2.0"));
    }

    #[test]
    fn test_finalize_already_released_is_noop() {
        let config = pipeline();
        let api = MockReleaseApi::with_tags(&["1.2.0-rc.3", "1.2.0"]);
        let resolver = VersionResolver::new(&api, "acme/api");

        let plan = resolver.next_version(&config, &request("prod", None)).unwrap();

        assert_eq!(plan.next, plan.current);
        assert!(plan.is_noop());
    }

    #[test]
    fn test_finalize_without_candidates_is_noop() {
        let config = pipeline();
        let api = MockReleaseApi::with_tags(&["1.0.0"]);
        let resolver = VersionResolver::new(&api, "acme/api");

        let plan = resolver.next_version(&config, &request("prod", None)).unwrap();
        assert!(plan.is_noop());
    }

    #[test]
    fn test_finalize_rejects_bump_kind() {
        let config = pipeline();
        let api = MockReleaseApi::with_tags(&["1.2.0-rc.3"]);
        let resolver = VersionResolver::new(&api, "acme/api");

        let err = resolver
            .next_version(&config, &request("prod", Some(ReleaseKind::Prerelease)))
            .unwrap_err();

        assert!(matches!(err, PromoteError::InvalidBumpForStage { .. }));
        assert_eq!(api.list_calls(), 0);
    }

    #[test]
    fn test_next_version_is_repeatable() {
        let config = pipeline();
        let api = MockReleaseApi::with_tags(&["1.0.0", "1.1.0-rc.0", "1.1.0-rc.1"]);
        let resolver = VersionResolver::new(&api, "acme/api");
        let req = request("staging", Some(ReleaseKind::Prerelease));

        let first = resolver.next_version(&config, &req).unwrap();
        let second = resolver.next_version(&config, &req).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.next, v("1.1.0-rc.2"));
    }

    #[test]
    fn test_unknown_stage() {
        let config = pipeline();
        let api = MockReleaseApi::new();
        let resolver = VersionResolver::new(&api, "acme/api");

        let err = resolver.next_version(&config, &request("qa", None)).unwrap_err();
        assert!(matches!(err, PromoteError::UnknownStage(_)));
    }
}
