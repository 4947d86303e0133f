//! Promotion workflow orchestration
//!
//! Runs one promotion end to end against injected git and release backends,
//! independent of argument parsing. Each step either advances the run or
//! stops it with a [PromotionFailure] naming the step.

use crate::config::Config;
use crate::domain::{PromotionOutcome, PromotionRequest, ReleaseId, ReleaseRecord};
use crate::error::{PromoteError, PromotionFailure, PromotionStage, Result};
use crate::git::{remote_branch, Repository};
use crate::github::ReleaseApi;
use crate::guard::RepositoryStateGuard;
use crate::promoter::{AppliedPromotion, BranchPromoter};
use crate::publisher::ReleasePublisher;
use crate::resolver::{ensure_bump_allowed, VersionResolver};
use crate::ui;

/// Echo an operation with what it returned, or the error it failed with
fn echo<T>(operation: &str, result: &Result<T>, describe: impl FnOnce(&T) -> String) {
    let output = match result {
        Ok(value) => describe(value),
        Err(e) => format!("error: {}", e),
    };
    ui::display_operation(operation, &output);
}

/// `<revision> <short hash>` per line, as resolved after a fetch
pub fn describe_refs<R: Repository>(repo: &R, revisions: &[String]) -> String {
    revisions
        .iter()
        .map(|revision| match repo.resolve(revision) {
            Ok(Some(oid)) => format!("{} {}", revision, ui::short_hash(&oid.to_string())),
            Ok(None) => format!("{} (missing)", revision),
            Err(e) => format!("{} ({})", revision, e),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// `+<prior>...<applied> <destination> (forced update)`, like `git push` prints
pub fn describe_push(prior: &str, applied: &str, destination: &str) -> String {
    format!(
        "+ {}...{} {} (forced update)",
        ui::short_hash(prior),
        ui::short_hash(applied),
        destination
    )
}

pub fn describe_created(release: &ReleaseId) -> String {
    format!("HTTP {} release {}", release.status, release)
}

pub struct PromotionOrchestrator<'a, R: Repository, A: ReleaseApi> {
    config: &'a Config,
    repo: &'a R,
    api: &'a A,
}

impl<'a, R: Repository, A: ReleaseApi> PromotionOrchestrator<'a, R, A> {
    pub fn new(config: &'a Config, repo: &'a R, api: &'a A) -> Self {
        PromotionOrchestrator { config, repo, api }
    }

    /// Main promotion workflow
    ///
    /// 1. Validate: stage and bump kind, fetch, clean tree, lost commits
    /// 2. Compute release notes (also in dry run)
    /// 3. Resolve the next version; stop if there is nothing new or on dry run
    /// 4. Force the destination branch to the source commit
    /// 5. Create the draft release, rolling the branch back if that fails
    pub fn run(
        &self,
        request: &PromotionRequest,
    ) -> std::result::Result<PromotionOutcome, PromotionFailure> {
        use PromotionStage::*;

        let remote = self.config.remote.as_str();
        let stage = self
            .config
            .stage(&request.stage)
            .map_err(PromotionFailure::at(Validating))?;
        ensure_bump_allowed(request, stage).map_err(PromotionFailure::at(Validating))?;
        let repository = self
            .config
            .repository_slug()
            .map_err(PromotionFailure::at(Validating))?;

        let (source, destination) = (stage.source.as_str(), stage.destination.as_str());
        let tracking = [remote_branch(remote, source), remote_branch(remote, destination)];
        tracing::info!(stage = %request.stage, source, destination, dry_run = request.dry_run, "starting promotion");
        ui::display_promotion_header(source, destination, request.dry_run);

        // Validating
        let fetched = self.repo.fetch(remote, &[source, destination]);
        echo(
            &format!("git fetch {} {} {}", remote, source, destination),
            &fetched,
            |_| describe_refs(self.repo, &tracking),
        );
        fetched.map_err(PromotionFailure::at(Validating))?;

        let guard = RepositoryStateGuard::new(self.repo, remote);
        let clean = guard.check_working_tree_clean();
        echo("git status --untracked-files=no", &clean, |_| {
            "working tree clean".to_string()
        });
        clean.map_err(PromotionFailure::at(Validating))?;

        let lost = guard.check_no_lost_commits(source, destination, request.force);
        echo(
            &format!("git log {}..{}", tracking[0], tracking[1]),
            &lost,
            |warning| match warning {
                Some(_) => format!("commits only on {} (forced)", destination),
                None => format!("no commits only on {}", destination),
            },
        );
        if let Some(warning) = lost.map_err(PromotionFailure::at(Validating))? {
            ui::display_boundary_warning(&warning);
        }

        // NotesComputed
        let publisher = ReleasePublisher::new(self.repo, self.api, remote);
        let notes = publisher.release_notes(source, destination, request.release_notes.as_deref());
        echo(
            &format!("git log --oneline {}...{}", tracking[0], tracking[1]),
            &notes,
            |notes| notes.clone(),
        );
        let notes = notes.map_err(PromotionFailure::at(NotesComputed))?;

        // VersionComputed
        let plan = VersionResolver::new(self.api, &repository).next_version(self.config, request);
        echo(
            &format!("GET /repos/{}/releases", repository),
            &plan,
            |plan| format!("current {}, next {}", plan.current, plan.next),
        );
        let plan = plan.map_err(PromotionFailure::at(VersionComputed))?;
        for warning in &plan.warnings {
            ui::display_boundary_warning(warning);
        }

        if plan.is_noop() {
            tracing::info!(current = %plan.current, next = %plan.next, "nothing to promote");
            ui::display_status(&format!(
                "Nothing to promote: {} is already at {}",
                destination, plan.current
            ));
            return Ok(PromotionOutcome::NothingToPromote {
                current: plan.current,
            });
        }

        ui::display_version_change(&plan.current, &plan.next);
        ui::display_release_notes(&notes);

        if request.dry_run {
            ui::display_status("Dry run: no branch pushed, no release created");
            return Ok(PromotionOutcome::DryRunComplete {
                current: plan.current,
                next: plan.next,
                notes,
            });
        }

        // Promoting
        let promoter = BranchPromoter::new(self.repo, remote);
        let applied = promoter.promote(source, destination);
        echo(
            &format!("git push --force {} {}:{}", remote, tracking[0], destination),
            &applied,
            |applied: &AppliedPromotion| {
                describe_push(
                    &applied.prior.to_string(),
                    &applied.applied.to_string(),
                    destination,
                )
            },
        );
        let applied = applied.map_err(PromotionFailure::at(Promoting))?;

        // Publishing
        let record = ReleaseRecord::draft(destination, plan.next.clone(), notes.clone(), stage.prerelease);
        let published = publisher.publish(&repository, &record);
        echo(
            &format!("POST /repos/{}/releases ({})", repository, record.name),
            &published,
            describe_created,
        );
        let release = match published {
            Ok(release) => release,
            Err(publish_error) => {
                let rolled_back = promoter.rollback(&applied);
                echo(
                    &format!("git push --force {} {}:{}", remote, applied.prior, destination),
                    &rolled_back,
                    |_| {
                        describe_push(
                            &applied.applied.to_string(),
                            &applied.prior.to_string(),
                            destination,
                        )
                    },
                );
                let cause = match rolled_back {
                    Ok(()) => {
                        ui::display_status(&format!(
                            "Rolled {} back to {}",
                            destination,
                            ui::short_hash(&applied.prior.to_string())
                        ));
                        publish_error
                    }
                    Err(rollback_error) => {
                        tracing::error!(error = %rollback_error, "rollback failed");
                        PromoteError::RollbackFailure {
                            destination: destination.to_string(),
                            prior: applied.prior.to_string(),
                            reason: rollback_error.to_string(),
                            original: Box::new(publish_error),
                        }
                    }
                };
                return Err(PromotionFailure::at(Publishing)(cause));
            }
        };

        ui::display_success(&format!("Created draft release {} {}", record.name, release));
        Ok(PromotionOutcome::Promoted {
            version: plan.next,
            notes,
            release,
        })
    }
}
