// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Two subcommands:
// - generate: read a repository and write a README generated by Gemini
// - collect:  read a repository and print the text that would be sent
//
// Credentials and endpoints are global options that can also come from the
// environment (GITHUB_TOKEN, GEMINI_API_KEY, ...), so keys never have to be
// typed on the command line or stored in the source.
// =============================================================================

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::github::AccessMode;
use crate::render::OutputFormat;

#[derive(Parser, Debug)]
#[command(
    name = "readme-gen",
    version,
    about = "Generate a README for a GitHub repository with Gemini",
    long_about = "readme-gen reads every source file of a GitHub repository, sends the text to \
                  Gemini together with a fixed README template, and prints the Markdown it returns."
)]
pub struct Cli {
    /// Print debug logs (RUST_LOG overrides this)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(flatten)]
    pub api: ApiArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Credentials and endpoints shared by every subcommand.
#[derive(Args, Clone)]
pub struct ApiArgs {
    /// GitHub token, sent only when --access private
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true, global = true)]
    pub github_token: Option<String>,

    /// Gemini API key (required by `generate`)
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true, global = true)]
    pub gemini_api_key: Option<String>,

    /// Gemini model name
    #[arg(long, env = "README_GEN_MODEL", default_value = "gemini-1.5-flash", global = true)]
    pub model: String,

    /// GitHub REST API base URL
    #[arg(long, env = "GITHUB_API_URL", default_value = "https://api.github.com", global = true)]
    pub github_api_url: String,

    /// Gemini API base URL
    #[arg(
        long,
        env = "GEMINI_API_URL",
        default_value = "https://generativelanguage.googleapis.com",
        global = true
    )]
    pub gemini_api_url: String,

    /// User-Agent header sent to GitHub
    #[arg(long, env = "README_GEN_USER_AGENT", default_value = "readme-gen", global = true)]
    pub user_agent: String,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 60, global = true)]
    pub timeout_secs: u64,
}

// Hand-written so `{:?}` on the parsed CLI never prints a credential
impl std::fmt::Debug for ApiArgs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let redact = |secret: &Option<String>| secret.as_ref().map(|_| "<redacted>");

        f.debug_struct("ApiArgs")
            .field("github_token", &redact(&self.github_token))
            .field("gemini_api_key", &redact(&self.gemini_api_key))
            .field("model", &self.model)
            .field("github_api_url", &self.github_api_url)
            .field("gemini_api_url", &self.gemini_api_url)
            .field("user_agent", &self.user_agent)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a README for a repository
    ///
    /// Example: readme-gen generate rust-lang/mdBook --output README.md
    Generate {
        #[command(flatten)]
        target: RepoArgs,

        /// Write the README to this file instead of stdout
        ///
        /// The file is only written when generation succeeds
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Markdown)]
        format: OutputFormat,

        /// Print a JSON object with the repository and README instead
        #[arg(long)]
        json: bool,
    },

    /// Print the collected repository text without calling Gemini
    ///
    /// Example: readme-gen collect octocat Hello-World --json
    Collect {
        #[command(flatten)]
        target: RepoArgs,

        /// Write the aggregate to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the collected files as JSON instead of one text blob
        #[arg(long)]
        json: bool,
    },
}

/// Which repository to read.
#[derive(Args, Debug, Clone)]
pub struct RepoArgs {
    /// Repository owner, or OWNER/REPO, or a GitHub URL
    pub owner: String,

    /// Repository name (omit when OWNER already includes it)
    pub repo: Option<String>,

    /// Read the repository anonymously or with GITHUB_TOKEN
    #[arg(long, value_enum, default_value_t = AccessMode::Public)]
    pub access: AccessMode,
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What does #[derive(Parser)] do?
//    - clap reads the struct fields and doc comments and generates the
//      argument parser and --help text from them
//
// 2. What is #[command(flatten)]?
//    - It pulls the fields of another Args struct into this command, so
//      ApiArgs and RepoArgs can be shared without repeating them
//
// 3. What does `env = "GITHUB_TOKEN"` do?
//    - When the flag is absent, clap falls back to the environment variable
//    - hide_env_values keeps the value out of --help output
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_generate() {
        let cli = Cli::try_parse_from([
            "readme-gen",
            "generate",
            "octocat/hello-world",
            "--access",
            "private",
            "--format",
            "html",
            "-o",
            "README.html",
        ])
        .unwrap();

        match cli.command {
            Commands::Generate {
                target,
                output,
                format,
                json,
            } => {
                assert_eq!(target.owner, "octocat/hello-world");
                assert_eq!(target.repo, None);
                assert_eq!(target.access, AccessMode::Private);
                assert_eq!(format, OutputFormat::Html);
                assert_eq!(output, Some(PathBuf::from("README.html")));
                assert!(!json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_collect_defaults() {
        let cli = Cli::try_parse_from(["readme-gen", "collect", "octocat", "hello-world", "--json"])
            .unwrap();

        assert_eq!(cli.api.timeout_secs, 60);
        match cli.command {
            Commands::Collect { target, json, .. } => {
                assert_eq!(target.repo.as_deref(), Some("hello-world"));
                assert_eq!(target.access, AccessMode::Public);
                assert!(json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_debug_output_hides_credentials() {
        let cli = Cli::try_parse_from([
            "readme-gen",
            "--github-token",
            "ghp_supersecret",
            "--gemini-api-key",
            "AIza_supersecret",
            "collect",
            "octocat/hello-world",
        ])
        .unwrap();

        let shown = format!("{cli:?}");
        assert!(!shown.contains("ghp_supersecret"));
        assert!(!shown.contains("AIza_supersecret"));
        assert!(shown.contains("<redacted>"));
        assert_eq!(cli.api.github_token.as_deref(), Some("ghp_supersecret"));
    }
}
