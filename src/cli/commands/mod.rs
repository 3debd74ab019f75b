use crate::config::BackporterConfig;
use crate::github::GitHubError;
use anyhow::Result;

pub mod action;
pub mod run;

pub use action::ActionCommand;
pub use run::RunCommand;

/// Token from the command line or GITHUB_TOKEN, then from configuration
pub fn resolve_token(cli_token: Option<&str>, config: &BackporterConfig) -> Result<String> {
    cli_token
        .or(config.github.token.as_deref())
        .filter(|token| !token.trim().is_empty())
        .map(str::to_string)
        .ok_or_else(|| {
            GitHubError::TokenNotFound(
                "No token given with --token, GITHUB_TOKEN or github.token".to_string(),
            )
            .into()
        })
}
