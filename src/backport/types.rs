// Core types for the backport workflow

use crate::github::CreatedProposal;
use std::fmt;

/// A maintenance branch a change should be backported to
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TargetBranch(String);

impl TargetBranch {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TargetBranch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The branch carrying the replayed commits, `backport-#<N>-to-<target>`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BackportBranch(String);

impl BackportBranch {
    pub fn new(change: u64, target: &TargetBranch) -> Self {
        Self(format!("backport-#{change}-to-{target}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BackportBranch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Why a branch ended up needing a manual backport
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConflictReason {
    /// A commit did not apply cleanly
    MergeConflict { commit: String, files: Vec<String> },
    /// A git operation failed for this branch only
    Local { message: String },
}

/// Terminal outcome for one target branch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackportResult {
    /// A backport branch already exists on the remote
    BranchExists { backport_branch: BackportBranch },
    /// The pull request has no commits
    NoCommits,
    /// Every commit is already present on the target branch
    AlreadyApplied,
    /// Manual instructions were posted on the pull request
    ConflictReported {
        backport_branch: BackportBranch,
        reason: ConflictReason,
    },
    /// The backport pull request was opened
    ProposalCreated(CreatedProposal),
}

impl BackportResult {
    pub fn proposal(&self) -> Option<&CreatedProposal> {
        match self {
            BackportResult::ProposalCreated(proposal) => Some(proposal),
            _ => None,
        }
    }
}

impl fmt::Display for BackportResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackportResult::BranchExists { backport_branch } => {
                write!(f, "skipped, {backport_branch} already exists in origin")
            }
            BackportResult::NoCommits => write!(f, "skipped, no commits to backport"),
            BackportResult::AlreadyApplied => write!(f, "skipped, all commits already present"),
            BackportResult::ConflictReported { reason, .. } => match reason {
                ConflictReason::MergeConflict { commit, .. } => {
                    write!(f, "conflict on {commit}, manual instructions posted")
                }
                ConflictReason::Local { message } => {
                    write!(f, "failed ({message}), manual instructions posted")
                }
            },
            BackportResult::ProposalCreated(proposal) => {
                write!(f, "created pull request #{}", proposal.number)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchReport {
    pub target: TargetBranch,
    pub result: BackportResult,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// No label carried the backport prefix
    NoBackportLabels,
    /// The pull request has not been merged
    NotMerged,
    /// Every target branch reached a terminal result
    Completed(Vec<BranchReport>),
}

/// Everything a run did, returned to the caller for rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub change: u64,
    pub outcome: RunOutcome,
}

impl RunReport {
    pub fn branches(&self) -> &[BranchReport] {
        match &self.outcome {
            RunOutcome::Completed(reports) => reports,
            _ => &[],
        }
    }

    pub fn proposals(&self) -> Vec<&CreatedProposal> {
        self.branches()
            .iter()
            .filter_map(|report| report.result.proposal())
            .collect()
    }
}
