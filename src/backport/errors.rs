use crate::git::GitError;
use crate::github::GitHubError;
use thiserror::Error;

/// Errors that abort a backport run
#[derive(Debug, Error)]
pub enum BackportError {
    #[error(transparent)]
    GitHub(#[from] GitHubError),
    #[error(transparent)]
    Git(#[from] GitError),
}
