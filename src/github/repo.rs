// src/github/repo.rs
// =============================================================================
// Identifies the repository a README is generated for.
//
// Accepted forms on the command line:
//   - two arguments: owner repo
//   - one argument:  owner/repo
//   - one argument:  https://github.com/owner/repo(.git)
//
// The access mode travels with the identifier because it decides whether the
// GitHub token is sent and whether inline file content may be used.
// =============================================================================

use anyhow::{anyhow, Result};
use clap::ValueEnum;
use serde::Serialize;
use std::fmt;

/// Whether the repository is read anonymously or with the configured token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessMode {
    Public,
    Private,
}

impl AccessMode {
    pub fn is_private(self) -> bool {
        matches!(self, AccessMode::Private)
    }
}

/// Owner, name and access mode of one repository.
///
/// Built once per run and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepoId {
    pub owner: String,
    pub name: String,
    pub access: AccessMode,
}

impl RepoId {
    /// Builds an identifier from the positional CLI arguments.
    ///
    /// When `name` is absent, `owner` must hold both parts (`owner/repo` or a
    /// GitHub URL).
    pub fn from_args(owner: &str, name: Option<&str>, access: AccessMode) -> Result<Self> {
        let (owner, name) = match name {
            Some(name) => (owner.trim().to_string(), name.trim().to_string()),
            None => parse_repo_arg(owner)?,
        };

        if owner.is_empty() || name.is_empty() {
            return Err(anyhow!("Owner and repository name must not be empty"));
        }

        Ok(Self {
            owner,
            name,
            access,
        })
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

// Splits "owner/repo" or a GitHub URL into (owner, repo)
//
// Example:
//   "https://github.com/rust-lang/rust" -> ("rust-lang", "rust")
fn parse_repo_arg(arg: &str) -> Result<(String, String)> {
    let arg = arg
        .trim()
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .trim_start_matches("www.");

    // A URL must point at github.com; a bare OWNER/REPO is taken as-is
    let path = if let Some(path) = arg.strip_prefix("github.com/") {
        path
    } else if arg.contains("://") || (arg.contains('.') && arg.split('/').count() > 2) {
        return Err(anyhow!("Not a GitHub URL: {}", arg));
    } else {
        arg
    };

    let parts: Vec<&str> = path.split('/').filter(|p| !p.is_empty()).collect();

    if parts.len() < 2 {
        return Err(anyhow!(
            "Expected OWNER REPO, OWNER/REPO or a GitHub URL, got: {}",
            arg
        ));
    }

    let owner = parts[0].to_string();
    let repo = parts[1].trim_end_matches(".git").to_string();

    Ok((owner, repo))
}
