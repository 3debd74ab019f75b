use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;

use backporter::cli::commands::{ActionCommand, RunCommand};
use backporter::cli::{Cli, Commands};
use backporter::config::BackporterConfig;
use backporter::telemetry::init_telemetry;

fn main() -> ExitCode {
    // Load .env before parsing so clap's env defaults see it
    let _ = BackporterConfig::load_env_file();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Backport failed");
            eprintln!("❌ {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = BackporterConfig::load()?;
    init_telemetry(&config.observability)?;

    match cli.command {
        Commands::Run {
            token,
            repository,
            number,
        } => tokio::runtime::Runtime::new()?.block_on(async {
            RunCommand::new(token, repository, number)
                .execute(&config)
                .await
                .map(|_| ())
        }),
        Commands::Action {
            token,
            repository,
            event_path,
        } => tokio::runtime::Runtime::new()?.block_on(async {
            ActionCommand::new(token, repository, event_path)
                .execute(&config)
                .await
        }),
    }
}
