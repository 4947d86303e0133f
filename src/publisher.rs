//! Release notes and release creation.

use std::fs;
use std::path::Path;

use crate::domain::{ReleaseId, ReleaseRecord};
use crate::error::Result;
use crate::git::{remote_branch, Repository};
use crate::github::ReleaseApi;

/// Render commit subjects as a bulleted list, one subject per line.
///
/// Quote characters wrapping a subject are dropped.
pub fn format_notes(subjects: &[String]) -> String {
    subjects
        .iter()
        .map(|subject| format!("- {}", subject.trim().trim_matches('"')))
        .collect::<Vec<_>>()
        .join("\n")
}

pub struct ReleasePublisher<'a, R: Repository, A: ReleaseApi> {
    repo: &'a R,
    api: &'a A,
    remote: &'a str,
}

impl<'a, R: Repository, A: ReleaseApi> ReleasePublisher<'a, R, A> {
    pub fn new(repo: &'a R, api: &'a A, remote: &'a str) -> Self {
        ReleasePublisher { repo, api, remote }
    }

    /// Notes for promoting `source` onto `destination`.
    ///
    /// Written to `notes_path` as well when one is given.
    pub fn release_notes(
        &self,
        source: &str,
        destination: &str,
        notes_path: Option<&Path>,
    ) -> Result<String> {
        let subjects = self.repo.subjects_between(
            &remote_branch(self.remote, source),
            &remote_branch(self.remote, destination),
        )?;
        let notes = format_notes(&subjects);

        if let Some(path) = notes_path {
            tracing::info!(path = %path.display(), "writing release notes");
            fs::write(path, &notes)?;
        }

        Ok(notes)
    }

    pub fn publish(&self, repository: &str, record: &ReleaseRecord) -> Result<ReleaseId> {
        tracing::info!(repository, tag = %record.tag, draft = record.draft, "publishing release");
        self.api.create_release(repository, record)
    }
}
