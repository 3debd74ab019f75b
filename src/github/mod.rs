pub mod client;
pub mod errors;
pub mod types;

pub use client::{GitHubClient, GitHubOps};
pub use errors::GitHubError;
pub use types::{ChangeRequest, CreatedProposal, ProposalRequest, RepositoryId, RepositoryInfo};
