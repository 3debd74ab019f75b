// Per-branch backport state machine

use std::collections::BTreeSet;

use tracing::{info, warn, Instrument};

use super::errors::BackportError;
use super::report::{self, ManualInstructions};
use super::types::{
    BackportBranch, BackportResult, BranchReport, ConflictReason, TargetBranch,
};
use crate::git::{CherryPickOutcome, Credentials, GitError, GitOperations};
use crate::github::{ChangeRequest, GitHubOps, ProposalRequest};

/// Everything shared by the backports of one pull request
#[derive(Debug, Clone)]
pub struct BackportPlan {
    pub change: ChangeRequest,
    pub commits: Vec<String>,
    pub clone_url: String,
}

/// States a single target branch moves through.
///
/// ```text
/// Guard -> Sync -> Replay -> Evaluate -> Publish -> Done
///   |        |        |          |          |
///   |        +--------+----------|----------+--> Conflict -> Done
///   +----------------------------+-------------------------> Done
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BranchState {
    /// Skip branches already backported or changes without commits
    Guard,
    /// Check out the target and create the backport branch on it
    Sync,
    /// Cherry-pick commits in order, stopping at the first conflict
    Replay,
    /// Decide whether the replay produced anything to publish
    Evaluate { changed: bool },
    /// Post manual instructions on the pull request
    Conflict(ConflictReason),
    /// Push the backport branch and open the pull request
    Publish,
    Done(BackportResult),
}

impl BranchState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, BranchState::Done(_))
    }
}

/// Drives one `BranchState` machine per target branch, strictly in sequence.
pub struct BackportExecutor<'a, G, H> {
    git: &'a G,
    github: &'a H,
    plan: &'a BackportPlan,
    credentials: &'a Credentials,
}

impl<'a, G: GitOperations, H: GitHubOps> BackportExecutor<'a, G, H> {
    pub fn new(
        git: &'a G,
        github: &'a H,
        plan: &'a BackportPlan,
        credentials: &'a Credentials,
    ) -> Self {
        Self {
            git,
            github,
            plan,
            credentials,
        }
    }

    /// Backport to every target; a target never starts before the previous
    /// one reached a terminal state.
    pub async fn run(
        &self,
        targets: &BTreeSet<TargetBranch>,
    ) -> Result<Vec<BranchReport>, BackportError> {
        let mut reports = Vec::with_capacity(targets.len());

        for target in targets {
            let backport_branch = BackportBranch::new(self.plan.change.number, target);
            let span = tracing::info_span!(
                "backport_branch",
                target_branch = %target,
                backport_branch = %backport_branch
            );

            let result = self
                .backport(target, &backport_branch)
                .instrument(span)
                .await?;
            info!("Backport to {}: {}", target, result);

            reports.push(BranchReport {
                target: target.clone(),
                result,
            });
        }

        Ok(reports)
    }

    /// Run a single target's machine to completion
    pub async fn backport(
        &self,
        target: &TargetBranch,
        backport_branch: &BackportBranch,
    ) -> Result<BackportResult, BackportError> {
        let mut state = BranchState::Guard;
        loop {
            state = match state {
                BranchState::Done(result) => return Ok(result),
                current => self.step(target, backport_branch, current).await?,
            };
        }
    }

    /// Perform the work of `state` and return the next state
    pub async fn step(
        &self,
        target: &TargetBranch,
        backport_branch: &BackportBranch,
        state: BranchState,
    ) -> Result<BranchState, BackportError> {
        match state {
            BranchState::Guard => recover(self.guard(backport_branch)),
            BranchState::Sync => recover(self.sync(target, backport_branch)),
            BranchState::Replay => recover(self.replay()),
            BranchState::Evaluate { changed } => Ok(evaluate(changed)),
            BranchState::Conflict(reason) => {
                self.report_conflict(target, backport_branch, reason).await
            }
            BranchState::Publish => self.publish(target, backport_branch).await,
            done @ BranchState::Done(_) => Ok(done),
        }
    }

    fn guard(&self, backport_branch: &BackportBranch) -> Result<BranchState, GitError> {
        if self.git.remote_branch_exists(backport_branch.as_str())? {
            info!("Branch {} already exists in origin, skipping", backport_branch);
            return Ok(BranchState::Done(BackportResult::BranchExists {
                backport_branch: backport_branch.clone(),
            }));
        }

        if self.plan.commits.is_empty() {
            info!("No commits to backport");
            return Ok(BranchState::Done(BackportResult::NoCommits));
        }

        Ok(BranchState::Sync)
    }

    fn sync(
        &self,
        target: &TargetBranch,
        backport_branch: &BackportBranch,
    ) -> Result<BranchState, GitError> {
        self.git.fetch_change_ref(self.plan.change.number)?;
        self.git.checkout_tracking_branch(target.as_str())?;
        self.git.create_branch(backport_branch.as_str())?;
        Ok(BranchState::Replay)
    }

    fn replay(&self) -> Result<BranchState, GitError> {
        let mut changed = false;

        for commit in &self.plan.commits {
            match self.git.cherry_pick(commit)? {
                CherryPickOutcome::Applied => changed = true,
                CherryPickOutcome::AlreadyPresent => {
                    info!(commit = %commit, "Commit already present, nothing to apply");
                }
                CherryPickOutcome::Conflict { files } => {
                    warn!(commit = %commit, files = ?files, "Cherry-pick conflict");
                    return Ok(BranchState::Conflict(ConflictReason::MergeConflict {
                        commit: commit.clone(),
                        files,
                    }));
                }
            }
        }

        Ok(BranchState::Evaluate { changed })
    }

    async fn report_conflict(
        &self,
        target: &TargetBranch,
        backport_branch: &BackportBranch,
        reason: ConflictReason,
    ) -> Result<BranchState, BackportError> {
        let instructions = ManualInstructions {
            clone_url: &self.plan.clone_url,
            change: self.plan.change.number,
            title: &self.plan.change.title,
            commits: &self.plan.commits,
            target,
            backport_branch,
        };
        let body = report::conflict_comment(&instructions, &reason);
        self.github.comment(self.plan.change.number, &body).await?;

        Ok(BranchState::Done(BackportResult::ConflictReported {
            backport_branch: backport_branch.clone(),
            reason,
        }))
    }

    async fn publish(
        &self,
        target: &TargetBranch,
        backport_branch: &BackportBranch,
    ) -> Result<BranchState, BackportError> {
        if let Err(err) = self.git.push(backport_branch.as_str(), self.credentials) {
            return recover(Err(err));
        }
        info!("Pushed {}", backport_branch);

        let request = ProposalRequest {
            title: report::proposal_title(target, &self.plan.change.title),
            head: backport_branch.to_string(),
            base: target.to_string(),
            body: report::proposal_body(self.plan.change.number, target),
            maintainer_can_modify: true,
            draft: false,
        };
        let proposal = self.github.create_proposal(&request).await?;

        Ok(BranchState::Done(BackportResult::ProposalCreated(proposal)))
    }
}

/// A replay that changed nothing has nothing to publish
pub fn evaluate(changed: bool) -> BranchState {
    if changed {
        BranchState::Publish
    } else {
        BranchState::Done(BackportResult::AlreadyApplied)
    }
}

/// Turn branch-local git failures into a conflict report; fatal ones abort
fn recover(result: Result<BranchState, GitError>) -> Result<BranchState, BackportError> {
    match result {
        Ok(state) => Ok(state),
        Err(err) if !err.is_fatal() => {
            warn!(error = %err, "Git operation failed for this branch");
            Ok(BranchState::Conflict(ConflictReason::Local {
                message: err.to_string(),
            }))
        }
        Err(err) => Err(err.into()),
    }
}
