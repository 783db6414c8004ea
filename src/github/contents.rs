// src/github/contents.rs
// =============================================================================
// Talks to the GitHub contents API.
//
// Two requests are needed to read a repository:
//   GET {api}/repos/{owner}/{repo}/contents/{path}   -> directory listing
//   GET {download_url}                               -> raw file text
//
// The listing is authenticated only for private repositories. Raw downloads
// are always anonymous; GitHub already signs the download URL it hands out
// for private files.
//
// The RepositorySource trait sits between the collector and the network so
// the collector can be tested against an in-memory tree.
// =============================================================================

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::header::ACCEPT;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use super::repo::{AccessMode, RepoId};
use crate::config::GitHubSettings;
use crate::error::CollectError;

/// Media type for the v3 REST API.
pub const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";

/// What kind of thing a listing entry points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Dir,
    Symlink,
    Submodule,
    #[serde(other)]
    Other,
}

/// One entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TreeEntry {
    pub name: String,
    pub path: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    /// Base64 payload, only embedded by some listings.
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub download_url: Option<String>,
}

/// Read access to a repository tree.
#[async_trait]
pub trait RepositorySource: Send + Sync {
    /// Lists the directory at `path` ("" is the repository root).
    async fn list(&self, repo: &RepoId, path: &str) -> Result<Vec<TreeEntry>, CollectError>;

    /// Fetches a file's raw text from its download URL.
    async fn download(&self, url: &str) -> Result<String, CollectError>;
}

/// reqwest-backed client for api.github.com (or a GitHub Enterprise host).
pub struct GitHubClient {
    client: Client,
    api_url: Url,
    token: Option<String>,
}

impl GitHubClient {
    pub fn new(settings: &GitHubSettings) -> Result<Self, CollectError> {
        let client = Client::builder()
            .user_agent(settings.user_agent.as_str())
            .timeout(settings.timeout)
            .build()?;

        Ok(Self {
            client,
            api_url: settings.api_url.clone(),
            token: settings.token.clone(),
        })
    }
}

#[async_trait]
impl RepositorySource for GitHubClient {
    async fn list(&self, repo: &RepoId, path: &str) -> Result<Vec<TreeEntry>, CollectError> {
        let url = contents_url(&self.api_url, repo, path);
        debug!(%url, "listing directory");

        let mut request = self.client.get(url).header(ACCEPT, GITHUB_ACCEPT);
        if let Some(token) = credential_for(repo.access, self.token.as_deref()) {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            warn!(status = status.as_u16(), path = display_path(path), "listing request failed");
            return Err(CollectError::from_status(status));
        }

        let body = response.text().await?;
        parse_listing(path, &body)
    }

    async fn download(&self, url: &str) -> Result<String, CollectError> {
        let shown = without_query(url);
        debug!(url = shown, "downloading file");

        let response = self.client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            warn!(status = status.as_u16(), url = shown, "download failed");
            return Err(CollectError::from_status(status));
        }

        Ok(response.text().await?)
    }
}

/// The token to send for a repository, if any.
///
/// Only private repositories are read with credentials; public ones are
/// always read anonymously even when a token is configured.
pub fn credential_for(access: AccessMode, token: Option<&str>) -> Option<&str> {
    match access {
        AccessMode::Private => token,
        AccessMode::Public => None,
    }
}

/// Builds `{api}/repos/{owner}/{repo}/contents/{path}`.
pub fn contents_url(api_url: &Url, repo: &RepoId, path: &str) -> Url {
    let mut url = api_url.clone();

    // Config only accepts http(s) base URLs, which always have segments
    if let Ok(mut segments) = url.path_segments_mut() {
        segments
            .pop_if_empty()
            .extend(["repos", repo.owner.as_str(), repo.name.as_str(), "contents"])
            .extend(path.split('/').filter(|s| !s.is_empty()));
    }

    url
}

/// Parses a listing body into entries.
pub fn parse_listing(path: &str, body: &str) -> Result<Vec<TreeEntry>, CollectError> {
    serde_json::from_str(body).map_err(|e| CollectError::MalformedListing {
        path: display_path(path).to_string(),
        reason: e.to_string(),
    })
}

/// Decodes an inline base64 payload.
///
/// GitHub wraps the payload at 60 columns, so whitespace is dropped before
/// decoding. Bytes that are not UTF-8 are replaced, never rejected.
pub fn decode_inline(content: &str) -> Option<String> {
    let compact: String = content.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = STANDARD.decode(compact).ok()?;
    Some(String::from_utf8_lossy(&bytes).into_owned())
}

/// A download URL with its query string (and any `?token=`) removed.
pub fn without_query(url: &str) -> &str {
    url.split_once('?').map_or(url, |(base, _)| base)
}

fn display_path(path: &str) -> &str {
    if path.is_empty() {
        "/"
    } else {
        path
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What does #[async_trait] do?
//    - Plain traits can't easily hold async methods that return boxed futures
//    - The macro rewrites `async fn` into a method returning
//      Pin<Box<dyn Future + Send>>, which trait objects can use
//
// 2. Why `Option<&str>` in credential_for?
//    - The token stays owned by the client; callers only borrow it
//    - as_deref() turns &Option<String> into Option<&str>
//
// 3. What is #[serde(other)]?
//    - A catch-all variant for "type" values GitHub may add later
//    - Without it, an unknown type would fail the whole listing
// -----------------------------------------------------------------------------
