use git2::build::{CheckoutBuilder, RepoBuilder};
use git2::{
    BranchType, Cred, CredentialType, ErrorClass, ErrorCode, FetchOptions, Oid, PushOptions,
    RemoteCallbacks, Repository, Signature,
};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Username GitHub expects alongside an installation or personal token.
const TOKEN_USERNAME: &str = "x-access-token";

#[derive(Debug, Error)]
pub enum GitError {
    #[error("Failed to clone {url}: {source}")]
    Clone { url: String, source: git2::Error },
    #[error("Authentication rejected by the remote: {message}")]
    Auth { message: String },
    #[error("Transport failure talking to the remote: {message}")]
    Transport { message: String },
    #[error("The working copy has not been prepared")]
    NotPrepared,
    #[error("Branch not found: {branch}")]
    BranchNotFound { branch: String },
    #[error("Invalid commit '{commit}': {message}")]
    InvalidCommit { commit: String, message: String },
    #[error("Push of '{branch}' was rejected: {message}")]
    PushRejected { branch: String, message: String },
    #[error("Git operation failed: {0}")]
    Git(git2::Error),
    #[error("Working copy IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<git2::Error> for GitError {
    fn from(err: git2::Error) -> Self {
        if err.code() == ErrorCode::Auth {
            GitError::Auth {
                message: err.message().to_string(),
            }
        } else if matches!(
            err.class(),
            ErrorClass::Net | ErrorClass::Http | ErrorClass::Ssl | ErrorClass::Ssh
        ) {
            GitError::Transport {
                message: err.message().to_string(),
            }
        } else {
            GitError::Git(err)
        }
    }
}

impl GitError {
    /// Whether the error compromises the whole working copy rather than a
    /// single branch. Fatal errors abort the run.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            GitError::Clone { .. }
                | GitError::Auth { .. }
                | GitError::Transport { .. }
                | GitError::NotPrepared
                | GitError::Io(_)
        )
    }
}

/// Result of replaying a single commit onto HEAD
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CherryPickOutcome {
    /// A new commit was created on HEAD
    Applied,
    /// The commit's changes are already part of HEAD
    AlreadyPresent,
    /// The commit does not apply cleanly; HEAD, index and working tree are untouched
    Conflict { files: Vec<String> },
}

/// HTTPS credentials used for clone, fetch and push
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    token: String,
}

impl Credentials {
    pub fn token(token: impl Into<String>) -> Self {
        Self {
            username: TOKEN_USERNAME.to_string(),
            token: token.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Version-control primitives the backport executor needs.
///
/// All operations act on a single working copy that `prepare` (re)creates.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait GitOperations {
    /// Remove any existing working copy and clone the repository fresh
    fn prepare(&mut self, clone_url: &str, credentials: &Credentials) -> Result<(), GitError>;

    /// Register and fetch the pull request head into `<remote>/pr/<number>`
    fn fetch_change_ref(&self, number: u64) -> Result<(), GitError>;

    /// Check whether `<remote>/<name>` is a known remote branch
    fn remote_branch_exists(&self, name: &str) -> Result<bool, GitError>;

    /// Check out a clean local branch tracking `<remote>/<target>`
    fn checkout_tracking_branch(&self, target: &str) -> Result<(), GitError>;

    /// Create a branch from HEAD and check it out
    fn create_branch(&self, name: &str) -> Result<(), GitError>;

    /// Replay one commit onto HEAD with conflict detection
    fn cherry_pick(&self, commit: &str) -> Result<CherryPickOutcome, GitError>;

    /// Push a local branch to the remote under the same name
    fn push(&self, branch: &str, credentials: &Credentials) -> Result<(), GitError>;
}

fn remote_callbacks(credentials: Option<&Credentials>) -> RemoteCallbacks<'_> {
    let mut callbacks = RemoteCallbacks::new();
    if let Some(credentials) = credentials {
        // libgit2 keeps asking while the server answers 401; give it one try.
        let attempted = Cell::new(false);
        callbacks.credentials(move |_url, _username_from_url, allowed| {
            if attempted.replace(true) || !allowed.contains(CredentialType::USER_PASS_PLAINTEXT) {
                return Err(git2::Error::new(
                    ErrorCode::Auth,
                    ErrorClass::Http,
                    "credentials were rejected by the remote",
                ));
            }
            Cred::userpass_plaintext(&credentials.username, &credentials.token)
        });
    }
    callbacks
}

/// Implementation of GitOperations using git2
pub struct Git2Operations {
    workdir: PathBuf,
    remote: String,
    repo: Option<Repository>,
    credentials: Option<Credentials>,
}

impl Git2Operations {
    pub fn new(workdir: impl Into<PathBuf>, remote: impl Into<String>) -> Self {
        Self {
            workdir: workdir.into(),
            remote: remote.into(),
            repo: None,
            credentials: None,
        }
    }

    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// Refspec mapping the pull request head into a remote-tracking ref
    pub fn change_refspec(&self, number: u64) -> String {
        format!(
            "+refs/pull/{number}/head:refs/remotes/{}/pr/{number}",
            self.remote
        )
    }

    fn repo(&self) -> Result<&Repository, GitError> {
        self.repo.as_ref().ok_or(GitError::NotPrepared)
    }

    fn fetch_options(&self) -> FetchOptions<'_> {
        let mut fetch_options = FetchOptions::new();
        fetch_options.remote_callbacks(remote_callbacks(self.credentials.as_ref()));
        fetch_options
    }

    fn signature(repo: &Repository) -> Result<Signature<'static>, GitError> {
        match repo.signature() {
            Ok(sig) => Ok(sig),
            Err(_) => Ok(Signature::now("Backporter", "noreply@backporter.invalid")?),
        }
    }
}

impl GitOperations for Git2Operations {
    fn prepare(&mut self, clone_url: &str, credentials: &Credentials) -> Result<(), GitError> {
        self.repo = None;
        if self.workdir.exists() {
            tracing::info!(path = %self.workdir.display(), "Removing existing working copy");
            std::fs::remove_dir_all(&self.workdir)?;
        }

        let mut fetch_options = FetchOptions::new();
        fetch_options.remote_callbacks(remote_callbacks(Some(credentials)));

        let remote_name = self.remote.clone();
        let mut builder = RepoBuilder::new();
        builder
            .fetch_options(fetch_options)
            .remote_create(move |repo, _name, url| repo.remote(&remote_name, url));

        let repo = builder.clone(clone_url, &self.workdir).map_err(|source| {
            if source.code() == ErrorCode::Auth {
                GitError::Auth {
                    message: source.message().to_string(),
                }
            } else {
                GitError::Clone {
                    url: clone_url.to_string(),
                    source,
                }
            }
        })?;

        tracing::info!(path = %self.workdir.display(), "Cloned working copy");
        self.credentials = Some(credentials.clone());
        self.repo = Some(repo);
        Ok(())
    }

    fn fetch_change_ref(&self, number: u64) -> Result<(), GitError> {
        let repo = self.repo()?;
        let refspec = self.change_refspec(number);

        let registered = repo
            .find_remote(&self.remote)?
            .fetch_refspecs()?
            .iter()
            .flatten()
            .any(|spec| spec == refspec);
        if !registered {
            repo.remote_add_fetch(&self.remote, &refspec)?;
        }

        let mut remote = repo.find_remote(&self.remote)?;
        let mut fetch_options = self.fetch_options();
        remote.fetch(&[refspec.as_str()], Some(&mut fetch_options), None)?;

        tracing::debug!(change = number, refspec = %refspec, "Fetched pull request ref");
        Ok(())
    }

    fn remote_branch_exists(&self, name: &str) -> Result<bool, GitError> {
        let repo = self.repo()?;
        let wanted = format!("{}/{}", self.remote, name);

        for branch in repo.branches(Some(BranchType::Remote))? {
            let (branch, _) = branch?;
            if branch.name()? == Some(wanted.as_str()) {
                return Ok(true);
            }
        }

        Ok(false)
    }

    fn checkout_tracking_branch(&self, target: &str) -> Result<(), GitError> {
        let repo = self.repo()?;
        let upstream = format!("{}/{}", self.remote, target);

        let commit = match repo.find_branch(&upstream, BranchType::Remote) {
            Ok(branch) => branch.get().peel_to_commit()?,
            Err(err) if err.code() == ErrorCode::NotFound => {
                return Err(GitError::BranchNotFound { branch: upstream });
            }
            Err(err) => return Err(err.into()),
        };

        // Leave whatever a previous iteration did behind before moving the branch.
        repo.cleanup_state()?;
        repo.set_head_detached(commit.id())?;
        repo.checkout_head(Some(CheckoutBuilder::new().force().remove_untracked(true)))?;

        let mut local = repo.branch(target, &commit, true)?;
        local.set_upstream(Some(upstream.as_str()))?;
        repo.set_head(&format!("refs/heads/{target}"))?;

        Ok(())
    }

    fn create_branch(&self, name: &str) -> Result<(), GitError> {
        let repo = self.repo()?;
        let head = repo.head()?.peel_to_commit()?;

        repo.branch(name, &head, false)?;
        repo.set_head(&format!("refs/heads/{name}"))?;

        Ok(())
    }

    fn cherry_pick(&self, commit_id: &str) -> Result<CherryPickOutcome, GitError> {
        let repo = self.repo()?;
        let invalid = |err: git2::Error| GitError::InvalidCommit {
            commit: commit_id.to_string(),
            message: err.message().to_string(),
        };

        let oid = Oid::from_str(commit_id).map_err(invalid)?;
        let commit = repo.find_commit(oid).map_err(invalid)?;
        let head = repo.head()?.peel_to_commit()?;

        let mainline = if commit.parent_count() > 1 { 1 } else { 0 };
        let mut index = repo.cherrypick_commit(&commit, &head, mainline, None)?;

        if index.has_conflicts() {
            let mut files = Vec::new();
            for conflict in index.conflicts()? {
                let conflict = conflict?;
                let entry = conflict.our.or(conflict.their).or(conflict.ancestor);
                if let Some(entry) = entry {
                    if let Ok(path) = std::str::from_utf8(&entry.path) {
                        files.push(path.to_string());
                    }
                }
            }
            return Ok(CherryPickOutcome::Conflict { files });
        }

        let tree_id = index.write_tree_to(repo)?;
        if tree_id == head.tree_id() {
            return Ok(CherryPickOutcome::AlreadyPresent);
        }

        let tree = repo.find_tree(tree_id)?;
        let committer = Self::signature(repo)?;
        repo.commit(
            Some("HEAD"),
            &commit.author(),
            &committer,
            commit.message().unwrap_or("Cherry-picked commit"),
            &tree,
            &[&head],
        )?;
        repo.checkout_head(Some(CheckoutBuilder::new().force()))?;

        Ok(CherryPickOutcome::Applied)
    }

    fn push(&self, branch: &str, credentials: &Credentials) -> Result<(), GitError> {
        let repo = self.repo()?;
        let mut remote = repo.find_remote(&self.remote)?;
        let refspec = format!("refs/heads/{branch}:refs/heads/{branch}");

        let rejection = RefCell::new(None);
        {
            let mut callbacks = remote_callbacks(Some(credentials));
            callbacks.push_update_reference(|refname, status| {
                if let Some(message) = status {
                    *rejection.borrow_mut() = Some(format!("{refname}: {message}"));
                }
                Ok(())
            });

            let mut push_options = PushOptions::new();
            push_options.remote_callbacks(callbacks);
            remote.push(&[refspec.as_str()], Some(&mut push_options))?;
        }

        if let Some(message) = rejection.into_inner() {
            return Err(GitError::PushRejected {
                branch: branch.to_string(),
                message,
            });
        }

        tracing::info!(branch = branch, "Pushed branch");
        Ok(())
    }
}
