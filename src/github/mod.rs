// src/github/mod.rs
// =============================================================================
// This module reads source files out of GitHub repositories.
//
// Submodules:
// - repo: who/what we are reading (owner, name, public or private)
// - contents: the contents API client and the RepositorySource trait
// - collect: the recursive walk that builds the aggregate
// =============================================================================

mod collect;
mod contents;
mod repo;

pub use collect::{collect, flatten};
pub use contents::{GitHubClient, RepositorySource};
pub use repo::{AccessMode, RepoId};

#[cfg(test)]
pub use contents::{EntryKind, TreeEntry};
