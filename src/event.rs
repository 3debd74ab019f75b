//! GitHub Actions `pull_request` event payloads
//!
//! Decides whether a workflow event should start a backport run.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::github::RepositoryId;

#[derive(Debug, Error)]
pub enum EventError {
    #[error("Failed to read event payload {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid event payload: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct PullRequestEvent {
    pub action: String,
    pub number: u64,
    pub pull_request: EventPullRequest,
    pub repository: EventRepository,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct EventPullRequest {
    #[serde(default)]
    pub merged: bool,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct EventRepository {
    pub full_name: String,
}

/// What to do with an incoming event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventDecision {
    Backport { number: u64 },
    /// The event comes from another repository, e.g. a fork
    ForeignRepository { full_name: String },
    NotCandidate { action: String, merged: bool },
}

impl PullRequestEvent {
    pub fn from_path(path: &Path) -> Result<Self, EventError> {
        let payload = std::fs::read(path).map_err(|source| EventError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_slice(&payload)
    }

    pub fn from_slice(payload: &[u8]) -> Result<Self, EventError> {
        Ok(serde_json::from_slice(payload)?)
    }

    /// A merged pull request that was just labelled or closed
    pub fn is_candidate(&self) -> bool {
        self.pull_request.merged && matches!(self.action.as_str(), "labeled" | "closed")
    }

    pub fn decide(&self, repository: &RepositoryId) -> EventDecision {
        if self.repository.full_name != repository.to_string() {
            return EventDecision::ForeignRepository {
                full_name: self.repository.full_name.clone(),
            };
        }

        if !self.is_candidate() {
            return EventDecision::NotCandidate {
                action: self.action.clone(),
                merged: self.pull_request.merged,
            };
        }

        EventDecision::Backport {
            number: self.number,
        }
    }
}
