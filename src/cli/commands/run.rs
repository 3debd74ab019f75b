use crate::backport::{BackportResult, Orchestrator, RunOutcome, RunReport};
use crate::config::BackporterConfig;
use crate::git::{Credentials, Git2Operations};
use crate::github::{GitHubClient, RepositoryId};
use anyhow::Result;

use super::resolve_token;

pub struct RunCommand {
    pub token: Option<String>,
    pub repository: String,
    pub number: u64,
}

impl RunCommand {
    pub fn new(token: Option<String>, repository: String, number: u64) -> Self {
        Self {
            token,
            repository,
            number,
        }
    }

    pub async fn execute(&self, config: &BackporterConfig) -> Result<RunReport> {
        let repository: RepositoryId = self.repository.parse()?;
        let token = resolve_token(self.token.as_deref(), config)?;

        let github = GitHubClient::new(&token, &repository, config.github.api_base_url.as_deref())?;
        let git = Git2Operations::new(
            config.backport.workdir_for(&repository.name),
            config.backport.remote.clone(),
        );

        tracing::info!(
            repository = %repository,
            change = self.number,
            "🔄 Backporting pull request #{}",
            self.number
        );

        let mut orchestrator = Orchestrator::new(
            git,
            github,
            Credentials::token(token),
            config.backport.label_prefix.clone(),
        );
        let report = orchestrator.run(self.number).await?;

        render(&report);
        Ok(report)
    }
}

fn render(report: &RunReport) {
    match &report.outcome {
        RunOutcome::NoBackportLabels => {
            println!("✅ No backport labels on #{}, nothing to do", report.change);
        }
        RunOutcome::NotMerged => {
            println!("✅ Pull request #{} is not merged, no backport performed", report.change);
        }
        RunOutcome::Completed(branches) => {
            println!("📋 Backport results for #{}:", report.change);
            for branch in branches {
                let marker = match branch.result {
                    BackportResult::ProposalCreated(_) => "✅",
                    BackportResult::ConflictReported { .. } => "⚠️ ",
                    _ => "⏭️ ",
                };
                println!("   {} {}: {}", marker, branch.target, branch.result);
            }
        }
    }
}
