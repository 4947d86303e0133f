use crate::error::{PromoteError, Result};
use crate::git::CommitInfo;
use git2::build::CheckoutBuilder;
use git2::{Oid, Repository as Git2Repo, Sort, StatusOptions, SubmoduleIgnore, SubmoduleStatus};
use secrecy::{ExposeSecret, SecretString};
use std::collections::HashMap;
use std::path::Path;

/// Username paired with a token for HTTPS basic auth against GitHub
const TOKEN_USERNAME: &str = "x-access-token";

const SUBMODULE_CHANGES: SubmoduleStatus = SubmoduleStatus::INDEX_ADDED
    .union(SubmoduleStatus::INDEX_DELETED)
    .union(SubmoduleStatus::INDEX_MODIFIED)
    .union(SubmoduleStatus::WD_ADDED)
    .union(SubmoduleStatus::WD_DELETED)
    .union(SubmoduleStatus::WD_MODIFIED)
    .union(SubmoduleStatus::WD_INDEX_MODIFIED)
    .union(SubmoduleStatus::WD_WD_MODIFIED);

/// Wrapper around git2::Repository with our trait interface
pub struct Git2Repository {
    repo: Git2Repo,
    token: Option<SecretString>,
}

impl Git2Repository {
    /// Open or discover a git repository
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Git2Repo::discover(path)?;

        Ok(Git2Repository { repo, token: None })
    }

    /// Create from existing git2::Repository
    pub fn from_git2(repo: Git2Repo) -> Self {
        Git2Repository { repo, token: None }
    }

    /// Authenticate fetches and pushes over HTTPS with this token
    pub fn with_token(mut self, token: SecretString) -> Self {
        self.token = Some(token);
        self
    }

    fn callbacks(&self) -> git2::RemoteCallbacks<'_> {
        let mut callbacks = git2::RemoteCallbacks::new();
        callbacks.credentials(|_url, username_from_url, allowed_types| {
            if allowed_types.contains(git2::CredentialType::USER_PASS_PLAINTEXT) {
                if let Some(token) = &self.token {
                    return git2::Cred::userpass_plaintext(TOKEN_USERNAME, token.expose_secret());
                }
            }

            if allowed_types.contains(git2::CredentialType::SSH_KEY) {
                return git2::Cred::ssh_key_from_agent(username_from_url.unwrap_or("git"));
            }

            git2::Cred::default()
        });
        callbacks
    }

    fn find_remote(&self, remote: &str) -> Result<git2::Remote<'_>> {
        self.repo
            .find_remote(remote)
            .map_err(|e| PromoteError::config(format!("Cannot find remote '{}': {}", remote, e)))
    }

    fn require(&self, revision: &str) -> Result<Oid> {
        use crate::git::Repository;

        self.resolve(revision)?.ok_or_else(|| {
            git2::Error::from_str(&format!("Revision '{}' not found", revision)).into()
        })
    }
}

impl super::Repository for Git2Repository {
    fn fetch(&self, remote: &str, branches: &[&str]) -> Result<()> {
        let mut remote_handle = self.find_remote(remote)?;

        let refspecs: Vec<String> = branches
            .iter()
            .map(|branch| format!("+refs/heads/{}:refs/remotes/{}/{}", branch, remote, branch))
            .collect();
        let refspec_strs: Vec<&str> = refspecs.iter().map(|s| s.as_str()).collect();

        let mut fetch_options = git2::FetchOptions::new();
        fetch_options.remote_callbacks(self.callbacks());

        tracing::info!(remote, ?branches, "fetching");
        remote_handle.fetch(&refspec_strs, Some(&mut fetch_options), None)?;

        Ok(())
    }

    fn dirty_paths(&self) -> Result<Vec<String>> {
        let mut options = StatusOptions::new();
        options.include_untracked(false).include_ignored(false);

        // submodule path -> name
        let submodules: HashMap<String, String> = self
            .repo
            .submodules()?
            .iter()
            .filter_map(|sm| {
                let path = sm.path().to_str()?.to_string();
                let name = sm.name().unwrap_or(&path).to_string();
                Some((path, name))
            })
            .collect();

        let statuses = self.repo.statuses(Some(&mut options))?;
        let mut paths = Vec::new();
        for entry in statuses.iter() {
            let status = entry.status();
            if status == git2::Status::CURRENT || status.contains(git2::Status::IGNORED) {
                continue;
            }
            let path = entry.path().unwrap_or("(non-utf8 path)");

            // untracked files inside a submodule do not count
            if let Some(name) = submodules.get(path) {
                let state = self.repo.submodule_status(name, SubmoduleIgnore::Untracked)?;
                if !state.intersects(SUBMODULE_CHANGES) {
                    continue;
                }
            }
            paths.push(path.to_string());
        }

        Ok(paths)
    }

    fn resolve(&self, revision: &str) -> Result<Option<Oid>> {
        match self.repo.revparse_single(revision) {
            Ok(object) => Ok(Some(object.peel_to_commit()?.id())),
            Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn commits_missing_from(&self, base: &str, tip: &str) -> Result<Vec<CommitInfo>> {
        let tip_oid = self.require(tip)?;

        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::TIME)?;
        revwalk.push(tip_oid)?;
        if let Some(base_oid) = self.resolve(base)? {
            revwalk.hide(base_oid)?;
        }

        let mut commits = Vec::new();
        for oid in revwalk {
            let commit = self.repo.find_commit(oid?)?;
            commits.push(CommitInfo {
                hash: commit.id().to_string(),
                summary: commit.summary().unwrap_or("(empty message)").to_string(),
                author: commit.author().name().unwrap_or("unknown").to_string(),
            });
        }

        Ok(commits)
    }

    fn subjects_between(&self, left: &str, right: &str) -> Result<Vec<String>> {
        let left_oid = self.require(left)?;
        let right_oid = self.require(right)?;

        let mut revwalk = self.repo.revwalk()?;
        revwalk.set_sorting(Sort::TOPOLOGICAL | Sort::REVERSE)?;
        revwalk.push(left_oid)?;
        revwalk.push(right_oid)?;

        match self.repo.merge_base(left_oid, right_oid) {
            Ok(base) => revwalk.hide(base)?,
            Err(e) if e.code() == git2::ErrorCode::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        let mut subjects = Vec::new();
        for oid in revwalk {
            let commit = self.repo.find_commit(oid?)?;
            subjects.push(commit.summary().unwrap_or_default().to_string());
        }

        Ok(subjects)
    }

    fn reset_branch(&self, branch: &str, target: Oid) -> Result<()> {
        let commit = self.repo.find_commit(target)?;

        self.repo
            .checkout_tree(commit.as_object(), Some(CheckoutBuilder::new().safe()))?;
        self.repo.set_head_detached(target)?;

        self.repo.branch(branch, &commit, true)?;
        self.repo.set_head(&format!("refs/heads/{}", branch))?;

        Ok(())
    }

    fn force_push(&self, remote: &str, branch: &str) -> Result<()> {
        let mut remote_handle = self.find_remote(remote)?;
        let local_ref = format!("refs/heads/{}", branch);
        let pushed = self.require(&local_ref)?;

        let mut callbacks = self.callbacks();
        callbacks.push_update_reference(|refname, status| match status {
            Some(status) => Err(git2::Error::from_str(&format!(
                "Remote rejected {}: {}",
                refname, status
            ))),
            None => Ok(()),
        });

        let mut push_options = git2::PushOptions::new();
        push_options.remote_callbacks(callbacks);

        let refspec = format!("+{}:{}", local_ref, local_ref);
        tracing::info!(remote, branch, commit = %pushed, "force pushing");
        remote_handle.push(&[refspec.as_str()], Some(&mut push_options))?;

        // keep origin/<branch> in step with what the remote now holds
        self.repo.reference(
            &format!("refs/remotes/{}/{}", remote, branch),
            pushed,
            true,
            "force push",
        )?;

        Ok(())
    }
}
