mod client;
mod commands;
mod config;
mod error;
mod models;
mod scheduler;
#[cfg(test)]
mod testing;

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use chrono::Utc;
use clap::{Parser, Subcommand};

use client::SportPlusClient;

/// Check and seed calendar entries on the sport-plus scheduling API.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Print detailed API responses
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    /// Path to a config file with the API base URL and users (built-in users when omitted)
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    /// Override the API base URL (e.g. "http://localhost:8080/v1")
    #[arg(long, global = true)]
    base_url: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sign in every user and print global and local schedules
    Check,

    /// Sign in every user and create a batch of test schedules
    ///
    /// Each user gets two local entries 1, 3, 7 and 30 days ahead;
    /// the coach gets five global entries a week ahead.
    Create {
        /// Print the entries instead of sending them
        #[arg(short = 'd', long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = run(&cli).await;
    ExitCode::from(report(result, &mut std::io::stdout()))
}

/// Write the one-line diagnostic for a failed run and return the process exit status.
fn report<W: Write>(result: Result<()>, out: &mut W) -> u8 {
    match result {
        Ok(()) => 0,
        Err(e) => {
            // Nothing more to do if stdout is gone.
            let _ = writeln!(out, "An error occurred: {:#}", e);
            1
        }
    }
}

async fn run(cli: &Cli) -> Result<()> {
    let cfg = config::load_config(cli.config.as_deref(), cli.base_url.as_deref())?;
    let api = SportPlusClient::new(&cfg.api.base_url)?;
    let mut stdout = std::io::stdout();

    match &cli.command {
        Command::Check => commands::run_check(&api, &cfg, &mut stdout).await,
        Command::Create { dry_run } => {
            commands::run_create(&api, &cfg, *dry_run, Utc::now(), &mut stdout).await
        }
    }
}
