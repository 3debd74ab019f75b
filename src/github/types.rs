use super::errors::GitHubError;
use std::fmt;
use std::str::FromStr;

/// A repository identified as `owner/name`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryId {
    pub owner: String,
    pub name: String,
}

impl FromStr for RepositoryId {
    type Err = GitHubError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || GitHubError::InvalidRepository(value.to_string());
        let (owner, name) = value.trim().split_once('/').ok_or_else(invalid)?;

        if owner.is_empty() || name.is_empty() || name.contains('/') {
            return Err(invalid());
        }

        Ok(Self {
            owner: owner.to_string(),
            name: name.to_string(),
        })
    }
}

impl fmt::Display for RepositoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// The pull request a backport is requested for
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeRequest {
    pub number: u64,
    pub title: String,
    pub merged: bool,
    pub base_ref: String,
    pub head_ref: String,
    pub labels: Vec<String>,
}

/// Repository metadata needed to clone and to build links
#[derive(Debug, Clone, PartialEq)]
pub struct RepositoryInfo {
    pub name: String,
    pub clone_url: String,
    pub html_url: String,
}

/// Parameters for opening a backport pull request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProposalRequest {
    pub title: String,
    pub head: String,
    pub base: String,
    pub body: String,
    pub maintainer_can_modify: bool,
    pub draft: bool,
}

/// A pull request opened by a backport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedProposal {
    pub number: u64,
    pub html_url: Option<String>,
    pub head_ref: String,
    pub base_ref: String,
}
