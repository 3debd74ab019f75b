use crate::config::BackporterConfig;
use crate::event::{EventDecision, PullRequestEvent};
use crate::github::RepositoryId;
use anyhow::Result;
use std::path::PathBuf;

use super::RunCommand;

pub struct ActionCommand {
    pub token: Option<String>,
    pub repository: String,
    pub event_path: PathBuf,
}

impl ActionCommand {
    pub fn new(token: Option<String>, repository: String, event_path: PathBuf) -> Self {
        Self {
            token,
            repository,
            event_path,
        }
    }

    pub async fn execute(&self, config: &BackporterConfig) -> Result<()> {
        let repository: RepositoryId = self.repository.parse()?;
        let event = PullRequestEvent::from_path(&self.event_path)?;

        match event.decide(&repository) {
            EventDecision::ForeignRepository { full_name } => {
                tracing::info!(
                    "Event is for {}, not {}, ignoring",
                    full_name,
                    repository
                );
            }
            EventDecision::NotCandidate { action, merged } => {
                tracing::info!(
                    action = %action,
                    merged,
                    "Event is not a merged pull request being labeled or closed, ignoring"
                );
            }
            EventDecision::Backport { number } => {
                RunCommand::new(self.token.clone(), self.repository.clone(), number)
                    .execute(config)
                    .await?;
            }
        }

        Ok(())
    }
}
