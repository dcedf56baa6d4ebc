use std::io::Write;

use anyhow::{Context, Result};
use clap::Parser;
use logshield_cli::cli::{Cli, Commands};
use logshield_cli::commands;
use logshield_core::Redactor;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let policy = cli.policy()?;
    let redactor = Redactor::new(&policy).context("failed to compile redaction rules")?;
    let mut stdout = std::io::stdout().lock();

    match &cli.command {
        Commands::Mask(args) => {
            commands::mask::run(&redactor, args, &mut stdout)?;
        }
        Commands::Check { file } => {
            let findings = commands::check::run(&redactor, file, &mut stdout)?;
            if findings > 0 {
                stdout.flush()?;
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
