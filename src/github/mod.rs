//! Release records in the hosting service.
//!
//! - [client::GitHubClient]: GitHub REST API over blocking `reqwest`
//! - [mock::MockReleaseApi]: In-memory release list for tests

pub mod client;
pub mod mock;

pub use client::GitHubClient;
pub use mock::MockReleaseApi;

use serde::{Deserialize, Serialize};

use crate::domain::{ReleaseId, ReleaseRecord};
use crate::error::Result;

/// A release as listed by the hosting service
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RemoteRelease {
    pub tag_name: String,
    #[serde(default)]
    pub prerelease: bool,
    #[serde(default)]
    pub draft: bool,
    #[serde(default)]
    pub target_commitish: String,
}

impl RemoteRelease {
    pub fn tagged(tag_name: impl Into<String>) -> Self {
        RemoteRelease {
            tag_name: tag_name.into(),
            prerelease: false,
            draft: false,
            target_commitish: String::new(),
        }
    }
}

/// JSON body of a release creation request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateReleaseRequest {
    pub tag_name: String,
    pub name: String,
    pub prerelease: bool,
    pub draft: bool,
    pub target_commitish: String,
    pub body: String,
}

impl From<&ReleaseRecord> for CreateReleaseRequest {
    fn from(record: &ReleaseRecord) -> Self {
        CreateReleaseRequest {
            tag_name: record.tag.to_string(),
            name: record.name.clone(),
            prerelease: record.prerelease,
            draft: record.draft,
            target_commitish: record.target.clone(),
            body: record.body.clone(),
        }
    }
}

/// Release operations of the hosting service.
pub trait ReleaseApi {
    /// Every release of `repository` (`owner/name`), drafts included.
    fn list_releases(&self, repository: &str) -> Result<Vec<RemoteRelease>>;

    /// Create a release; a non-2xx answer is [crate::error::PromoteError::PublishError].
    fn create_release(&self, repository: &str, record: &ReleaseRecord) -> Result<ReleaseId>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Version;

    #[test]
    fn test_create_request_body() {
        let record = ReleaseRecord::draft(
            "prod",
            Version::parse("1.2.0").unwrap(),
            "- ship it",
            false,
        );
        let body = serde_json::to_value(CreateReleaseRequest::from(&record)).unwrap();

        assert_eq!(
            body,
            serde_json::json!({
                "tag_name": "1.2.0",
                "name": "prod 1.2.0",
                "prerelease": false,
                "draft": true,
                "target_commitish": "prod",
                "body": "- ship it",
            })
        );
    }

    #[test]
    fn test_remote_release_ignores_extra_fields() {
        let listed: Vec<RemoteRelease> = serde_json::from_str(
            r#"[{"id": 1, "tag_name": "1.1.0-rc.1", "prerelease": true, "draft": false,
                 "target_commitish": "staging", "author": {"login": "ci"}},
                {"tag_name": "1.0.0"}]"#,
        )
        .unwrap();

        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].tag_name, "1.1.0-rc.1");
        assert!(listed[0].prerelease);
        assert_eq!(listed[1], RemoteRelease::tagged("1.0.0"));
    }
}
