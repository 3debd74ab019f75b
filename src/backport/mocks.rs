// Recording fakes for the git and GitHub seams - no side effects

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::git::{CherryPickOutcome, Credentials, GitError, GitOperations};
use crate::github::{
    ChangeRequest, CreatedProposal, GitHubError, GitHubOps, ProposalRequest, RepositoryInfo,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitCommand {
    Prepare { clone_url: String },
    FetchChangeRef { number: u64 },
    RemoteBranchExists { name: String },
    CheckoutTrackingBranch { target: String },
    CreateBranch { name: String },
    CherryPick { commit: String },
    Push { branch: String },
}

impl GitCommand {
    /// Whether the command changes the working copy or the remote
    pub fn is_mutation(&self) -> bool {
        !matches!(self, GitCommand::RemoteBranchExists { .. })
    }
}

/// Git fake keyed on the branch currently checked out
#[derive(Debug, Default)]
pub struct RecordingGit {
    pub remote_branches: RefCell<HashSet<String>>,
    pub missing_targets: RefCell<HashSet<String>>,
    pub outcomes: RefCell<HashMap<(String, String), CherryPickOutcome>>,
    pub current_target: RefCell<Option<String>>,
    pub prepare_failure: RefCell<Option<GitError>>,
    pub push_failure: RefCell<Option<GitError>>,
    pub executed_commands: RefCell<Vec<GitCommand>>,
}

impl RecordingGit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_remote_branch(&self, name: &str) {
        self.remote_branches.borrow_mut().insert(name.to_string());
    }

    pub fn set_missing_target(&self, target: &str) {
        self.missing_targets.borrow_mut().insert(target.to_string());
    }

    /// Outcome of cherry-picking `commit` onto `target`; `Applied` otherwise
    pub fn set_outcome(&self, target: &str, commit: &str, outcome: CherryPickOutcome) {
        self.outcomes
            .borrow_mut()
            .insert((target.to_string(), commit.to_string()), outcome);
    }

    pub fn fail_prepare(&self, error: GitError) {
        *self.prepare_failure.borrow_mut() = Some(error);
    }

    pub fn fail_next_push(&self, error: GitError) {
        *self.push_failure.borrow_mut() = Some(error);
    }

    pub fn get_executed_commands(&self) -> Vec<GitCommand> {
        self.executed_commands.borrow().clone()
    }

    pub fn clear_executed_commands(&self) {
        self.executed_commands.borrow_mut().clear();
    }

    pub fn mutations(&self) -> Vec<GitCommand> {
        self.get_executed_commands()
            .into_iter()
            .filter(GitCommand::is_mutation)
            .collect()
    }

    fn record(&self, command: GitCommand) {
        self.executed_commands.borrow_mut().push(command);
    }
}

impl GitOperations for RecordingGit {
    fn prepare(&mut self, clone_url: &str, _credentials: &Credentials) -> Result<(), GitError> {
        self.record(GitCommand::Prepare {
            clone_url: clone_url.to_string(),
        });
        match self.prepare_failure.borrow_mut().take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn fetch_change_ref(&self, number: u64) -> Result<(), GitError> {
        self.record(GitCommand::FetchChangeRef { number });
        Ok(())
    }

    fn remote_branch_exists(&self, name: &str) -> Result<bool, GitError> {
        self.record(GitCommand::RemoteBranchExists {
            name: name.to_string(),
        });
        Ok(self.remote_branches.borrow().contains(name))
    }

    fn checkout_tracking_branch(&self, target: &str) -> Result<(), GitError> {
        self.record(GitCommand::CheckoutTrackingBranch {
            target: target.to_string(),
        });
        if self.missing_targets.borrow().contains(target) {
            return Err(GitError::BranchNotFound {
                branch: format!("origin/{target}"),
            });
        }
        *self.current_target.borrow_mut() = Some(target.to_string());
        Ok(())
    }

    fn create_branch(&self, name: &str) -> Result<(), GitError> {
        self.record(GitCommand::CreateBranch {
            name: name.to_string(),
        });
        Ok(())
    }

    fn cherry_pick(&self, commit: &str) -> Result<CherryPickOutcome, GitError> {
        self.record(GitCommand::CherryPick {
            commit: commit.to_string(),
        });
        let target = self.current_target.borrow().clone().unwrap_or_default();
        Ok(self
            .outcomes
            .borrow()
            .get(&(target, commit.to_string()))
            .cloned()
            .unwrap_or(CherryPickOutcome::Applied))
    }

    fn push(&self, branch: &str, _credentials: &Credentials) -> Result<(), GitError> {
        self.record(GitCommand::Push {
            branch: branch.to_string(),
        });
        if let Some(error) = self.push_failure.borrow_mut().take() {
            return Err(error);
        }
        self.remote_branches.borrow_mut().insert(branch.to_string());
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitHubCommand {
    FetchChangeRequest { number: u64 },
    ListCommits { number: u64 },
    FetchRepository,
    Comment { number: u64, body: String },
    CreateProposal(ProposalRequest),
}

/// GitHub fake serving one pull request and recording every call
#[derive(Debug)]
pub struct RecordingGitHub {
    pub change: Mutex<ChangeRequest>,
    pub commits: Mutex<Vec<String>>,
    pub repository: RepositoryInfo,
    pub next_proposal: Mutex<u64>,
    pub executed_commands: Mutex<Vec<GitHubCommand>>,
}

impl RecordingGitHub {
    pub fn new(change: ChangeRequest, commits: Vec<String>) -> Self {
        Self {
            change: Mutex::new(change),
            commits: Mutex::new(commits),
            repository: RepositoryInfo {
                name: "octo-repo".to_string(),
                clone_url: "https://github.com/octo-org/octo-repo.git".to_string(),
                html_url: "https://github.com/octo-org/octo-repo".to_string(),
            },
            next_proposal: Mutex::new(100),
            executed_commands: Mutex::new(Vec::new()),
        }
    }

    pub fn get_executed_commands(&self) -> Vec<GitHubCommand> {
        self.lock_commands().clone()
    }

    pub fn comments(&self) -> Vec<String> {
        self.lock_commands()
            .iter()
            .filter_map(|command| match command {
                GitHubCommand::Comment { body, .. } => Some(body.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn proposals(&self) -> Vec<ProposalRequest> {
        self.lock_commands()
            .iter()
            .filter_map(|command| match command {
                GitHubCommand::CreateProposal(request) => Some(request.clone()),
                _ => None,
            })
            .collect()
    }

    fn lock_commands(&self) -> std::sync::MutexGuard<'_, Vec<GitHubCommand>> {
        self.executed_commands
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn record(&self, command: GitHubCommand) {
        self.lock_commands().push(command);
    }
}

#[async_trait]
impl GitHubOps for RecordingGitHub {
    async fn fetch_change_request(&self, number: u64) -> Result<ChangeRequest, GitHubError> {
        self.record(GitHubCommand::FetchChangeRequest { number });
        Ok(self.change.lock().unwrap().clone())
    }

    async fn list_commits(&self, number: u64) -> Result<Vec<String>, GitHubError> {
        self.record(GitHubCommand::ListCommits { number });
        Ok(self.commits.lock().unwrap().clone())
    }

    async fn fetch_repository(&self) -> Result<RepositoryInfo, GitHubError> {
        self.record(GitHubCommand::FetchRepository);
        Ok(self.repository.clone())
    }

    async fn comment(&self, number: u64, body: &str) -> Result<(), GitHubError> {
        self.record(GitHubCommand::Comment {
            number,
            body: body.to_string(),
        });
        Ok(())
    }

    async fn create_proposal(
        &self,
        request: &ProposalRequest,
    ) -> Result<CreatedProposal, GitHubError> {
        self.record(GitHubCommand::CreateProposal(request.clone()));
        let mut next = self.next_proposal.lock().unwrap();
        *next += 1;
        Ok(CreatedProposal {
            number: *next,
            html_url: Some(format!("{}/pull/{}", self.repository.html_url, *next)),
            head_ref: request.head.clone(),
            base_ref: request.base.clone(),
        })
    }
}
