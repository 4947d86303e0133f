use crate::error::Result;
use crate::git::{CommitInfo, Repository};
use git2::Oid;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

/// Mock repository for testing without actual git operations.
///
/// Revisions are looked up verbatim in a ref table; `force_push` copies the
/// local branch to `<remote>/<branch>` so tests can observe what the remote
/// ends up holding.
pub struct MockRepository {
    refs: RefCell<HashMap<String, Oid>>,
    dirty: Vec<String>,
    missing: HashMap<(String, String), Vec<CommitInfo>>,
    subjects: HashMap<(String, String), Vec<String>>,
    pushes: RefCell<Vec<(String, Oid)>>,
    fetches: RefCell<Vec<String>>,
    successful_pushes_left: Cell<Option<usize>>,
}

impl MockRepository {
    /// Create a new empty mock repository
    pub fn new() -> Self {
        MockRepository {
            refs: RefCell::new(HashMap::new()),
            dirty: Vec::new(),
            missing: HashMap::new(),
            subjects: HashMap::new(),
            pushes: RefCell::new(Vec::new()),
            fetches: RefCell::new(Vec::new()),
            successful_pushes_left: Cell::new(None),
        }
    }

    /// Deterministic commit id for tests
    pub fn oid(n: u8) -> Oid {
        Oid::from_bytes(&[n; 20]).expect("20 bytes is a valid oid")
    }

    /// Point a revision (e.g. `origin/staging` or `staging`) at a commit
    pub fn set_ref(&mut self, revision: impl Into<String>, oid: Oid) {
        self.refs.get_mut().insert(revision.into(), oid);
    }

    /// Mark tracked paths as modified
    pub fn set_dirty(&mut self, paths: &[&str]) {
        self.dirty = paths.iter().map(|p| p.to_string()).collect();
    }

    /// Commits reachable from `tip` but not `base`
    pub fn set_missing_commits(&mut self, base: &str, tip: &str, commits: Vec<CommitInfo>) {
        self.missing
            .insert((base.to_string(), tip.to_string()), commits);
    }

    /// Summaries returned for `left...right`
    pub fn set_subjects(&mut self, left: &str, right: &str, subjects: &[&str]) {
        self.subjects.insert(
            (left.to_string(), right.to_string()),
            subjects.iter().map(|s| s.to_string()).collect(),
        );
    }

    /// Let `count` pushes succeed, then reject every later one
    pub fn fail_pushes_after(&self, count: usize) {
        self.successful_pushes_left.set(Some(count));
    }

    /// Current target of a revision
    pub fn ref_target(&self, revision: &str) -> Option<Oid> {
        self.refs.borrow().get(revision).copied()
    }

    /// Branches pushed so far, with the commit each push carried
    pub fn pushes(&self) -> Vec<(String, Oid)> {
        self.pushes.borrow().clone()
    }

    /// Branches fetched so far
    pub fn fetches(&self) -> Vec<String> {
        self.fetches.borrow().clone()
    }
}

impl Default for MockRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl Repository for MockRepository {
    fn fetch(&self, remote: &str, branches: &[&str]) -> Result<()> {
        self.fetches.borrow_mut().extend(
            branches
                .iter()
                .map(|branch| crate::git::remote_branch(remote, branch)),
        );
        Ok(())
    }

    fn dirty_paths(&self) -> Result<Vec<String>> {
        Ok(self.dirty.clone())
    }

    fn resolve(&self, revision: &str) -> Result<Option<Oid>> {
        if let Some(oid) = self.ref_target(revision) {
            return Ok(Some(oid));
        }
        Ok(Oid::from_str(revision).ok())
    }

    fn commits_missing_from(&self, base: &str, tip: &str) -> Result<Vec<CommitInfo>> {
        Ok(self
            .missing
            .get(&(base.to_string(), tip.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    fn subjects_between(&self, left: &str, right: &str) -> Result<Vec<String>> {
        Ok(self
            .subjects
            .get(&(left.to_string(), right.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    fn reset_branch(&self, branch: &str, target: Oid) -> Result<()> {
        self.refs.borrow_mut().insert(branch.to_string(), target);
        Ok(())
    }

    fn force_push(&self, remote: &str, branch: &str) -> Result<()> {
        if let Some(left) = self.successful_pushes_left.get() {
            if left == 0 {
                return Err(git2::Error::from_str("remote rejected push").into());
            }
            self.successful_pushes_left.set(Some(left - 1));
        }

        let oid = self.ref_target(branch).ok_or_else(|| {
            git2::Error::from_str(&format!("Local branch '{}' does not exist", branch))
        })?;
        self.refs
            .borrow_mut()
            .insert(crate::git::remote_branch(remote, branch), oid);
        self.pushes.borrow_mut().push((branch.to_string(), oid));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_repository_resolve() {
        let mut repo = MockRepository::new();
        repo.set_ref("origin/staging", MockRepository::oid(1));

        assert_eq!(
            repo.resolve("origin/staging").unwrap(),
            Some(MockRepository::oid(1))
        );
        assert_eq!(repo.resolve("origin/prod").unwrap(), None);
    }

    #[test]
    fn test_mock_repository_resolves_hashes() {
        let repo = MockRepository::new();
        let oid = MockRepository::oid(9);
        assert_eq!(repo.resolve(&oid.to_string()).unwrap(), Some(oid));
    }

    #[test]
    fn test_mock_force_push_updates_remote() {
        let repo = MockRepository::new();
        repo.reset_branch("staging", MockRepository::oid(2)).unwrap();
        repo.force_push("origin", "staging").unwrap();

        assert_eq!(repo.ref_target("origin/staging"), Some(MockRepository::oid(2)));
        assert_eq!(
            repo.pushes(),
            vec![("staging".to_string(), MockRepository::oid(2))]
        );
    }

    #[test]
    fn test_mock_push_failure_injection() {
        let repo = MockRepository::new();
        repo.reset_branch("staging", MockRepository::oid(2)).unwrap();
        repo.fail_pushes_after(1);

        assert!(repo.force_push("origin", "staging").is_ok());
        assert!(repo.force_push("origin", "staging").is_err());
        assert_eq!(repo.pushes().len(), 1);
    }

    #[test]
    fn test_mock_repository_default() {
        let repo = MockRepository::default();
        assert!(repo.dirty_paths().unwrap().is_empty());
        assert!(repo.subjects_between("a", "b").unwrap().is_empty());
    }
}
