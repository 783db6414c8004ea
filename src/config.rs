// src/config.rs
// =============================================================================
// Turns parsed CLI options into validated settings for the two API clients.
//
// Nothing secret has a default: the GitHub token and the Gemini key come only
// from flags or environment variables. Validation happens here, before any
// request is made, so a typo in a URL fails fast with exit code 2.
// =============================================================================

use anyhow::{anyhow, bail, Context, Result};
use std::time::Duration;
use url::Url;

use crate::cli::ApiArgs;
use crate::github::AccessMode;

/// Settings for the GitHub contents client.
#[derive(Clone)]
pub struct GitHubSettings {
    pub api_url: Url,
    pub token: Option<String>,
    pub user_agent: String,
    pub timeout: Duration,
}

/// Settings for the Gemini client.
#[derive(Clone)]
pub struct GeminiSettings {
    pub api_url: Url,
    pub api_key: String,
    pub model: String,
    pub timeout: Duration,
}

// Hand-written so the key never shows up in debug output
impl std::fmt::Debug for GeminiSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiSettings")
            .field("api_url", &self.api_url.as_str())
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl GitHubSettings {
    /// Validates GitHub settings for a run with the given access mode.
    ///
    /// Private reads need a token; public reads ignore one if present.
    pub fn from_args(args: &ApiArgs, access: AccessMode) -> Result<Self> {
        let token = non_empty(args.github_token.as_deref());

        if access.is_private() && token.is_none() {
            bail!("--access private needs a GitHub token (set GITHUB_TOKEN or pass --github-token)");
        }

        let user_agent = args.user_agent.trim();
        if user_agent.is_empty() {
            bail!("User-Agent must not be empty; GitHub rejects requests without one");
        }

        Ok(Self {
            api_url: parse_base_url("--github-api-url", &args.github_api_url)?,
            token,
            user_agent: user_agent.to_string(),
            timeout: timeout(args)?,
        })
    }
}

impl GeminiSettings {
    pub fn from_args(args: &ApiArgs) -> Result<Self> {
        let api_key = non_empty(args.gemini_api_key.as_deref()).ok_or_else(|| {
            anyhow!("a Gemini API key is required (set GEMINI_API_KEY or pass --gemini-api-key)")
        })?;

        let model = args.model.trim();
        if model.is_empty() || model.contains('/') {
            bail!("Invalid model name: '{}'", args.model);
        }

        Ok(Self {
            api_url: parse_base_url("--gemini-api-url", &args.gemini_api_url)?,
            api_key,
            model: model.to_string(),
            timeout: timeout(args)?,
        })
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn timeout(args: &ApiArgs) -> Result<Duration> {
    if args.timeout_secs == 0 {
        bail!("--timeout-secs must be greater than zero");
    }
    Ok(Duration::from_secs(args.timeout_secs))
}

// Base URLs must be http(s) so path segments can be appended to them
fn parse_base_url(flag: &str, value: &str) -> Result<Url> {
    let url = Url::parse(value).with_context(|| format!("Invalid URL for {flag}: '{value}'"))?;

    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        bail!("{flag} must be an http(s) URL, got '{value}'");
    }
    if url.query().is_some() {
        bail!("{flag} must not contain a query string");
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> ApiArgs {
        ApiArgs {
            github_token: None,
            gemini_api_key: Some("key".to_string()),
            model: "gemini-1.5-flash".to_string(),
            github_api_url: "https://api.github.com".to_string(),
            gemini_api_url: "https://generativelanguage.googleapis.com".to_string(),
            user_agent: "readme-gen".to_string(),
            timeout_secs: 30,
        }
    }

    #[test]
    fn test_public_access_needs_no_token() {
        let settings = GitHubSettings::from_args(&args(), AccessMode::Public).unwrap();
        assert_eq!(settings.token, None);
        assert_eq!(settings.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_private_access_requires_token() {
        assert!(GitHubSettings::from_args(&args(), AccessMode::Private).is_err());

        let mut with_token = args();
        with_token.github_token = Some("  ".to_string());
        assert!(GitHubSettings::from_args(&with_token, AccessMode::Private).is_err());

        with_token.github_token = Some("ghp_example".to_string());
        let settings = GitHubSettings::from_args(&with_token, AccessMode::Private).unwrap();
        assert_eq!(settings.token.as_deref(), Some("ghp_example"));
    }

    #[test]
    fn test_gemini_key_required() {
        let mut missing = args();
        missing.gemini_api_key = None;
        assert!(GeminiSettings::from_args(&missing).is_err());
        assert!(GeminiSettings::from_args(&args()).is_ok());
    }

    #[test]
    fn test_debug_redacts_key() {
        let settings = GeminiSettings::from_args(&args()).unwrap();
        let printed = format!("{settings:?}");
        assert!(printed.contains("<redacted>"));
        assert!(!printed.contains("\"key\""));
    }

    #[test]
    fn test_rejects_bad_urls() {
        let mut bad = args();
        bad.github_api_url = "ftp://example.com".to_string();
        assert!(GitHubSettings::from_args(&bad, AccessMode::Public).is_err());

        let mut bad = args();
        bad.gemini_api_url = "https://example.com/?key=leak".to_string();
        assert!(GeminiSettings::from_args(&bad).is_err());

        let mut bad = args();
        bad.github_api_url = "mailto:someone@example.com".to_string();
        assert!(GitHubSettings::from_args(&bad, AccessMode::Public).is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut bad = args();
        bad.timeout_secs = 0;
        assert!(GitHubSettings::from_args(&bad, AccessMode::Public).is_err());
    }
}
