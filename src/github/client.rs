use super::errors::GitHubError;
use super::types::{ChangeRequest, CreatedProposal, ProposalRequest, RepositoryId, RepositoryInfo};
use async_trait::async_trait;
use octocrab::Octocrab;
use serde::Deserialize;

/// GitHub caps `per_page` at 100 for the pull request commits listing.
const COMMITS_PER_PAGE: usize = 100;

/// Platform operations the backport workflow depends on.
///
/// The executor and orchestrator only talk to GitHub through this trait so
/// they can be driven by in-memory fakes in tests.
#[async_trait]
pub trait GitHubOps: Send + Sync {
    /// Read a pull request: title, labels, merge status and refs
    async fn fetch_change_request(&self, number: u64) -> Result<ChangeRequest, GitHubError>;

    /// List the SHAs of a pull request's commits, in GitHub's order
    async fn list_commits(&self, number: u64) -> Result<Vec<String>, GitHubError>;

    /// Read clone and web URLs of the repository
    async fn fetch_repository(&self) -> Result<RepositoryInfo, GitHubError>;

    /// Post a comment on a pull request
    async fn comment(&self, number: u64, body: &str) -> Result<(), GitHubError>;

    /// Open a new pull request
    async fn create_proposal(
        &self,
        request: &ProposalRequest,
    ) -> Result<CreatedProposal, GitHubError>;
}

#[derive(Debug, Deserialize)]
struct PullRequestCommit {
    sha: String,
}

#[derive(Debug)]
pub struct GitHubClient {
    octocrab: Octocrab,
    owner: String,
    repo: String,
}

impl GitHubClient {
    pub fn new(
        token: &str,
        repository: &RepositoryId,
        api_base_url: Option<&str>,
    ) -> Result<Self, GitHubError> {
        if token.trim().is_empty() {
            return Err(GitHubError::TokenNotFound(
                "The GitHub token is empty".to_string(),
            ));
        }

        let mut builder = Octocrab::builder().personal_token(token.to_string());
        if let Some(base_url) = api_base_url {
            builder = builder.base_uri(base_url)?;
        }
        let octocrab = builder.build()?;

        Ok(GitHubClient {
            octocrab,
            owner: repository.owner.clone(),
            repo: repository.name.clone(),
        })
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn repo(&self) -> &str {
        &self.repo
    }
}

#[async_trait]
impl GitHubOps for GitHubClient {
    async fn fetch_change_request(&self, number: u64) -> Result<ChangeRequest, GitHubError> {
        let pr = self
            .octocrab
            .pulls(&self.owner, &self.repo)
            .get(number)
            .await?;

        let labels = pr
            .labels
            .as_ref()
            .map(|labels| labels.iter().map(|label| label.name.clone()).collect())
            .unwrap_or_default();

        Ok(ChangeRequest {
            number: pr.number,
            title: pr.title.clone().unwrap_or_default(),
            merged: pr.merged.unwrap_or(false) || pr.merged_at.is_some(),
            base_ref: pr.base.ref_field.clone(),
            head_ref: pr.head.ref_field.clone(),
            labels,
        })
    }

    async fn list_commits(&self, number: u64) -> Result<Vec<String>, GitHubError> {
        let route = format!(
            "/repos/{}/{}/pulls/{}/commits",
            self.owner, self.repo, number
        );

        let mut commits = Vec::new();
        let mut page = 1u32;
        loop {
            let params = [
                ("per_page", COMMITS_PER_PAGE.to_string()),
                ("page", page.to_string()),
            ];
            let batch: Vec<PullRequestCommit> = self.octocrab.get(&route, Some(&params[..])).await?;
            let received = batch.len();
            commits.extend(batch.into_iter().map(|commit| commit.sha));

            if received < COMMITS_PER_PAGE {
                break;
            }
            page += 1;
        }

        tracing::debug!(change = number, count = commits.len(), "Listed pull request commits");
        Ok(commits)
    }

    async fn fetch_repository(&self) -> Result<RepositoryInfo, GitHubError> {
        let repository = self.octocrab.repos(&self.owner, &self.repo).get().await?;
        let resource = format!("repository {}/{}", self.owner, self.repo);

        let clone_url = repository
            .clone_url
            .as_ref()
            .map(|url| url.to_string())
            .ok_or_else(|| GitHubError::MissingField {
                resource: resource.clone(),
                field: "clone_url",
            })?;
        let html_url = repository
            .html_url
            .as_ref()
            .map(|url| url.to_string())
            .ok_or(GitHubError::MissingField {
                resource,
                field: "html_url",
            })?;

        Ok(RepositoryInfo {
            name: repository.name.clone(),
            clone_url,
            html_url,
        })
    }

    async fn comment(&self, number: u64, body: &str) -> Result<(), GitHubError> {
        self.octocrab
            .issues(&self.owner, &self.repo)
            .create_comment(number, body)
            .await?;

        tracing::info!(change = number, "💬 Created comment on pull request");
        Ok(())
    }

    async fn create_proposal(
        &self,
        request: &ProposalRequest,
    ) -> Result<CreatedProposal, GitHubError> {
        let pr = self
            .octocrab
            .pulls(&self.owner, &self.repo)
            .create(&request.title, &request.head, &request.base)
            .body(request.body.as_str())
            .maintainer_can_modify(request.maintainer_can_modify)
            .draft(request.draft)
            .send()
            .await?;

        let proposal = CreatedProposal {
            number: pr.number,
            html_url: pr.html_url.as_ref().map(|url| url.to_string()),
            head_ref: pr.head.ref_field.clone(),
            base_ref: pr.base.ref_field.clone(),
        };

        tracing::info!(
            number = proposal.number,
            url = proposal.html_url.as_deref().unwrap_or(""),
            "📋 Created pull request {}",
            request.title
        );
        Ok(proposal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repository() -> RepositoryId {
        "octo-org/octo-repo".parse().unwrap()
    }

    #[tokio::test]
    async fn test_empty_token_is_rejected() {
        let result = GitHubClient::new("  ", &repository(), None);
        assert!(matches!(result, Err(GitHubError::TokenNotFound(_))));
    }

    #[tokio::test]
    async fn test_client_keeps_owner_and_repo() {
        let client = GitHubClient::new("token", &repository(), None).unwrap();
        assert_eq!(client.owner(), "octo-org");
        assert_eq!(client.repo(), "octo-repo");
    }
}
