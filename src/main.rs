// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging (stderr, so stdout only ever carries the README)
// 3. Dispatch to the appropriate subcommand handler
// 4. Exit with proper code (0 = success, 1 = GitHub/Gemini error, 2 = usage error)
// =============================================================================

mod cli;        // src/cli.rs - command-line parsing
mod config;     // src/config.rs - credentials and endpoints
mod error;      // src/error.rs - error taxonomy
mod generate;   // src/generate/ - README generation with Gemini
mod github;     // src/github/ - reading repository files
mod pipeline;   // src/pipeline.rs - collect -> generate
mod render;     // src/render.rs - output formats and writing

use anyhow::Result;
use clap::Parser;
use std::path::Path;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use cli::{ApiArgs, Cli, Commands, RepoArgs};
use config::{GeminiSettings, GitHubSettings};
use generate::GeminiClient;
use github::{GitHubClient, RepoId};
use pipeline::{Outcome, Pipeline};
use render::OutputFormat;

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            // Usage, configuration or I/O problems
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Returns:
//   Ok(0) = README (or aggregate) produced
//   Ok(1) = GitHub or Gemini returned an error
//   Err   = bad arguments, configuration or local I/O
async fn run() -> Result<i32> {
    let Cli {
        verbose,
        api,
        command,
    } = Cli::parse();

    init_logging(verbose);

    match command {
        Commands::Generate {
            target,
            output,
            format,
            json,
        } => handle_generate(&api, &target, output.as_deref(), format, json).await,
        Commands::Collect {
            target,
            output,
            json,
        } => handle_collect(&api, &target, output.as_deref(), json).await,
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

// Handles the 'generate' subcommand
async fn handle_generate(
    api: &ApiArgs,
    target: &RepoArgs,
    output: Option<&Path>,
    format: OutputFormat,
    json: bool,
) -> Result<i32> {
    let repo = RepoId::from_args(&target.owner, target.repo.as_deref(), target.access)?;

    // Validate both sides before the first request goes out
    let github = GitHubClient::new(&GitHubSettings::from_args(api, repo.access)?)?;
    let gemini = GeminiClient::new(&GeminiSettings::from_args(api)?)?;

    info!(repo = %repo, "generating README");

    let outcome = Pipeline::new(&github, &gemini).run(&repo).await;

    render::publish(&outcome, format, json, output)?;

    match outcome {
        Outcome::Done(report) => {
            if report.files == 0 {
                warn!(repo = %repo, "no matching source files were found; README is based on an empty listing");
            }
            Ok(0)
        }
        Outcome::Failed { stage, error } => {
            debug!(stage = ?stage, "run ended with an error");
            eprintln!("Error: {}", error);
            Ok(1)
        }
    }
}

// Handles the 'collect' subcommand
async fn handle_collect(
    api: &ApiArgs,
    target: &RepoArgs,
    output: Option<&Path>,
    json: bool,
) -> Result<i32> {
    let repo = RepoId::from_args(&target.owner, target.repo.as_deref(), target.access)?;
    let client = GitHubClient::new(&GitHubSettings::from_args(api, repo.access)?)?;

    let files = match github::collect(&client, &repo).await {
        Ok(files) => files,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(1);
        }
    };

    if files.is_empty() {
        warn!(repo = %repo, "no matching source files were found");
    }

    let body = if json {
        serde_json::to_string_pretty(&files)?
    } else {
        github::flatten(&files)
    };

    render::write_output(output, &body)?;
    Ok(0)
}
