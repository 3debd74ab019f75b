// Run-level workflow: resolve targets, prepare the working copy, backport, summarize

use tracing::{info, Instrument};

use super::errors::BackportError;
use super::executor::{BackportExecutor, BackportPlan};
use super::labels::resolve_target_branches;
use super::report;
use super::types::{RunOutcome, RunReport, TargetBranch};
use crate::git::{Credentials, GitOperations};
use crate::github::GitHubOps;

pub struct Orchestrator<G, H> {
    git: G,
    github: H,
    credentials: Credentials,
    label_prefix: String,
}

impl<G: GitOperations, H: GitHubOps> Orchestrator<G, H> {
    pub fn new(git: G, github: H, credentials: Credentials, label_prefix: impl Into<String>) -> Self {
        Self {
            git,
            github,
            credentials,
            label_prefix: label_prefix.into(),
        }
    }

    pub fn git(&self) -> &G {
        &self.git
    }

    pub fn github(&self) -> &H {
        &self.github
    }

    /// Backport pull request `number` to every branch named by its labels.
    ///
    /// Nothing is cloned unless the pull request is merged and carries at
    /// least one backport label. A single summary comment lists the pull
    /// requests opened, when there are any.
    pub async fn run(&mut self, number: u64) -> Result<RunReport, BackportError> {
        let correlation_id = crate::telemetry::generate_correlation_id();
        let span = crate::telemetry::create_backport_span(number, &correlation_id);
        self.run_inner(number).instrument(span).await
    }

    async fn run_inner(&mut self, number: u64) -> Result<RunReport, BackportError> {
        let change = self.github.fetch_change_request(number).await?;

        let targets = resolve_target_branches(&change.labels, &self.label_prefix);
        if targets.is_empty() {
            info!("No backport labels on #{}, nothing to do", number);
            return Ok(RunReport {
                change: number,
                outcome: RunOutcome::NoBackportLabels,
            });
        }

        if !change.merged {
            info!("Pull request #{} is not merged, skipping backport", number);
            return Ok(RunReport {
                change: number,
                outcome: RunOutcome::NotMerged,
            });
        }

        info!(
            "Backporting #{} to {}",
            number,
            targets
                .iter()
                .map(TargetBranch::as_str)
                .collect::<Vec<_>>()
                .join(", ")
        );

        let repository = self.github.fetch_repository().await?;
        self.git.prepare(&repository.clone_url, &self.credentials)?;
        self.git.fetch_change_ref(number)?;
        let commits = self.github.list_commits(number).await?;

        let plan = BackportPlan {
            change,
            commits,
            clone_url: repository.clone_url.clone(),
        };
        let reports = BackportExecutor::new(&self.git, &self.github, &plan, &self.credentials)
            .run(&targets)
            .await?;

        let report = RunReport {
            change: number,
            outcome: RunOutcome::Completed(reports),
        };
        if let Some(summary) = report::summary_comment(&report.proposals(), &repository.html_url) {
            self.github.comment(number, &summary).await?;
        }

        Ok(report)
    }
}
