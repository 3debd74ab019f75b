//! Git operations module
//!
//! The working copy used for backports is driven through the `GitOperations`
//! trait; `Git2Operations` implements it with libgit2 bindings.

pub mod operations;

pub use operations::{CherryPickOutcome, Credentials, Git2Operations, GitError, GitOperations};

#[cfg(any(test, feature = "testing"))]
pub use operations::MockGitOperations;
