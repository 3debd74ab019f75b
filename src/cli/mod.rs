use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;

#[derive(Parser)]
#[command(name = "backporter")]
#[command(about = "Backport merged pull requests to the branches named by their labels")]
#[command(long_about = "Backporter replays the commits of a merged pull request onto every branch \
                       named by a 'backport-<branch>' label and opens one pull request per branch. \
                       When a commit does not apply cleanly, it comments on the original pull \
                       request with the commands to finish the backport by hand.")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Backport a pull request to every branch named by its labels
    Run {
        /// GitHub token used for API calls, clone and push
        #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
        token: Option<String>,
        /// Repository as OWNER/NAME
        repository: String,
        /// Pull request number
        number: u64,
    },
    /// Backport from a GitHub Actions pull_request event
    Action {
        /// GitHub token used for API calls, clone and push
        #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
        token: Option<String>,
        /// Repository the workflow runs in, as OWNER/NAME
        #[arg(long, env = "GITHUB_REPOSITORY")]
        repository: String,
        /// Path to the event payload
        #[arg(long, env = "GITHUB_EVENT_PATH")]
        event_path: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_run() {
        let cli = Cli::try_parse_from([
            "backporter",
            "run",
            "--token",
            "abc",
            "octo-org/octo-repo",
            "42",
        ])
        .unwrap();

        match cli.command {
            Commands::Run {
                token,
                repository,
                number,
            } => {
                assert_eq!(token.as_deref(), Some("abc"));
                assert_eq!(repository, "octo-org/octo-repo");
                assert_eq!(number, 42);
            }
            Commands::Action { .. } => panic!("expected run"),
        }
    }

    #[test]
    fn test_run_rejects_non_numeric_change() {
        assert!(Cli::try_parse_from(["backporter", "run", "o/r", "abc"]).is_err());
    }
}
