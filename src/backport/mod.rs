//! Backport workflow
//!
//! A merged pull request labelled `backport-<branch>` is replayed onto each
//! named branch. Every branch ends in exactly one `BackportResult`: a new pull
//! request, a skip, or a comment with manual instructions.

pub mod errors;
pub mod executor;
pub mod labels;
pub mod orchestrator;
pub mod report;
pub mod types;

#[cfg(test)]
pub mod mocks;

pub use errors::BackportError;
pub use executor::{BackportExecutor, BackportPlan, BranchState};
pub use labels::{resolve_target_branches, DEFAULT_LABEL_PREFIX};
pub use orchestrator::Orchestrator;
pub use types::{
    BackportBranch, BackportResult, BranchReport, ConflictReason, RunOutcome, RunReport,
    TargetBranch,
};
