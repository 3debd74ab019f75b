// Backporter Library - replays merged pull requests onto maintenance branches
// This exposes the core components for testing and integration

pub mod backport;
pub mod cli;
pub mod config;
pub mod event;
pub mod git;
pub mod github;
pub mod telemetry;

// Re-export key types for easy access
pub use backport::{
    resolve_target_branches, BackportError, BackportResult, Orchestrator, RunOutcome, RunReport,
    TargetBranch,
};
pub use config::BackporterConfig;
pub use event::{EventDecision, PullRequestEvent};
pub use git::{Git2Operations, GitError, GitOperations};
pub use github::{GitHubClient, GitHubError, GitHubOps, RepositoryId};
pub use telemetry::{create_backport_span, generate_correlation_id, init_telemetry};
