use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::domain::{ReleaseId, ReleaseRecord};
use crate::error::{PromoteError, Result};
use crate::github::{CreateReleaseRequest, ReleaseApi, RemoteRelease};

/// Releases requested per page when listing
pub const PER_PAGE: usize = 100;

const USER_AGENT: &str = concat!("git-promote/", env!("CARGO_PKG_VERSION"));
const ACCEPT: &str = "application/vnd.github+json";
const API_VERSION: &str = "2022-11-28";

/// GitHub REST API client for releases.
///
/// Requests block until answered; there is no timeout beyond the transport's.
pub struct GitHubClient {
    api_url: String,
    token: SecretString,
    http: reqwest::blocking::Client,
}

#[derive(Debug, Deserialize)]
struct CreatedRelease {
    id: u64,
    #[serde(default)]
    html_url: Option<String>,
}

impl GitHubClient {
    pub fn new(api_url: impl Into<String>, token: SecretString) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .build()?;

        Ok(GitHubClient {
            api_url: api_url.into().trim_end_matches('/').to_string(),
            token,
            http,
        })
    }

    fn releases_url(&self, repository: &str) -> String {
        format!("{}/repos/{}/releases", self.api_url, repository)
    }

    fn get(&self, url: &str) -> reqwest::blocking::RequestBuilder {
        self.http
            .get(url)
            .header("Accept", ACCEPT)
            .header("X-GitHub-Api-Version", API_VERSION)
            .bearer_auth(self.token.expose_secret())
    }
}

impl ReleaseApi for GitHubClient {
    fn list_releases(&self, repository: &str) -> Result<Vec<RemoteRelease>> {
        let base = self.releases_url(repository);
        let mut releases = Vec::new();

        for page in 1.. {
            let url = format!("{}?per_page={}&page={}", base, PER_PAGE, page);
            tracing::info!(%url, "listing releases");

            let response = self.get(&url).send()?;
            let status = response.status();
            if !status.is_success() {
                let body = response
                    .text()
                    .unwrap_or_else(|_| "unable to read response body".to_string());
                return Err(PromoteError::ReleaseListing {
                    status: status.as_u16(),
                    body,
                });
            }

            let batch: Vec<RemoteRelease> = response.json()?;
            let last_page = batch.len() < PER_PAGE;
            releases.extend(batch);
            if last_page {
                break;
            }
        }

        tracing::debug!(count = releases.len(), repository, "listed releases");
        Ok(releases)
    }

    fn create_release(&self, repository: &str, record: &ReleaseRecord) -> Result<ReleaseId> {
        let url = self.releases_url(repository);
        let payload = CreateReleaseRequest::from(record);
        tracing::info!(%url, tag = %payload.tag_name, "creating draft release");

        let response = self
            .http
            .post(&url)
            .header("Accept", ACCEPT)
            .header("X-GitHub-Api-Version", API_VERSION)
            .bearer_auth(self.token.expose_secret())
            .json(&payload)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .unwrap_or_else(|_| "unable to read response body".to_string());
            return Err(PromoteError::PublishError {
                status: status.as_u16(),
                body,
            });
        }

        let created: CreatedRelease = response.json()?;
        Ok(ReleaseId {
            id: created.id,
            html_url: created.html_url,
            status: status.as_u16(),
        })
    }
}
