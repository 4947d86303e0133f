use std::cell::{Cell, RefCell};

use crate::domain::{ReleaseId, ReleaseRecord};
use crate::error::{PromoteError, Result};
use crate::github::{ReleaseApi, RemoteRelease};

/// In-memory release list for testing without HTTP
#[derive(Default)]
pub struct MockReleaseApi {
    releases: RefCell<Vec<RemoteRelease>>,
    created: RefCell<Vec<ReleaseRecord>>,
    failure: Option<(u16, String)>,
    list_calls: Cell<usize>,
}

impl MockReleaseApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed with releases tagged as given
    pub fn with_tags(tags: &[&str]) -> Self {
        let api = Self::new();
        api.releases
            .borrow_mut()
            .extend(tags.iter().map(|tag| RemoteRelease::tagged(*tag)));
        api
    }

    /// Answer every creation with this HTTP status and body
    pub fn failing_with(mut self, status: u16, body: impl Into<String>) -> Self {
        self.failure = Some((status, body.into()));
        self
    }

    /// Releases created so far
    pub fn created(&self) -> Vec<ReleaseRecord> {
        self.created.borrow().clone()
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.get()
    }
}

impl ReleaseApi for MockReleaseApi {
    fn list_releases(&self, _repository: &str) -> Result<Vec<RemoteRelease>> {
        self.list_calls.set(self.list_calls.get() + 1);
        Ok(self.releases.borrow().clone())
    }

    fn create_release(&self, _repository: &str, record: &ReleaseRecord) -> Result<ReleaseId> {
        if let Some((status, body)) = &self.failure {
            return Err(PromoteError::PublishError {
                status: *status,
                body: body.clone(),
            });
        }

        let mut releases = self.releases.borrow_mut();
        releases.push(RemoteRelease {
            tag_name: record.tag.to_string(),
            prerelease: record.prerelease,
            draft: record.draft,
            target_commitish: record.target.clone(),
        });
        self.created.borrow_mut().push(record.clone());

        Ok(ReleaseId {
            id: releases.len() as u64,
            html_url: None,
            status: 201,
        })
    }
}
