// src/error.rs
// =============================================================================
// Error types for the two pipeline stages.
//
// - CollectError: anything that goes wrong while walking the repository
// - GenerationError: anything that goes wrong while talking to Gemini
// - PipelineError: either of the above, tagged with the stage that failed
//
// Every variant is terminal. Nothing retries; the caller reports the message
// and the user runs the command again.
// =============================================================================

use reqwest::StatusCode;
use thiserror::Error;

/// Errors raised while listing or downloading repository files.
#[derive(Error, Debug)]
pub enum CollectError {
    /// HTTP 404 from the contents API.
    #[error("Repo not found. If it's private, make sure your token has access.")]
    NotFound,

    /// HTTP 403, usually missing scopes or an exhausted rate limit.
    #[error("Access denied. Check token permissions or rate limits.")]
    Forbidden,

    /// HTTP 401.
    #[error("Bad token. Please check your GitHub token.")]
    Unauthorized,

    /// Any other non-2xx status.
    #[error("GitHub API error: {}", .status.as_u16())]
    RemoteApi { status: StatusCode },

    /// The listing body was not a JSON array of entries.
    #[error("unexpected listing for '{path}': {reason}")]
    MalformedListing { path: String, reason: String },

    /// The request never produced a response (DNS, TLS, timeout, ...).
    ///
    /// Download URLs of private files carry a token in their query string,
    /// so the wrapped error has its URL stripped.
    #[error("request to GitHub failed: {0}")]
    Transport(reqwest::Error),
}

impl From<reqwest::Error> for CollectError {
    fn from(error: reqwest::Error) -> Self {
        CollectError::Transport(error.without_url())
    }
}

impl CollectError {
    /// Maps a non-success status to its error kind.
    pub fn from_status(status: StatusCode) -> Self {
        match status {
            StatusCode::NOT_FOUND => CollectError::NotFound,
            StatusCode::FORBIDDEN => CollectError::Forbidden,
            StatusCode::UNAUTHORIZED => CollectError::Unauthorized,
            status => CollectError::RemoteApi { status },
        }
    }
}

/// Errors raised by the text-generation endpoint.
#[derive(Error, Debug)]
pub enum GenerationError {
    /// Non-2xx response, or a 2xx without a usable candidate.
    #[error("{0}")]
    Api(String),

    /// The request never produced a response.
    ///
    /// The wrapped error has its URL stripped so the API key never ends up
    /// in a log line or on the terminal.
    #[error("request to Gemini failed: {0}")]
    Transport(reqwest::Error),
}

impl From<reqwest::Error> for GenerationError {
    fn from(error: reqwest::Error) -> Self {
        GenerationError::Transport(error.without_url())
    }
}

/// A failed pipeline run.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Collect(#[from] CollectError),

    #[error(transparent)]
    Generate(#[from] GenerationError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            CollectError::from_status(StatusCode::NOT_FOUND),
            CollectError::NotFound
        ));
        assert!(matches!(
            CollectError::from_status(StatusCode::FORBIDDEN),
            CollectError::Forbidden
        ));
        assert!(matches!(
            CollectError::from_status(StatusCode::UNAUTHORIZED),
            CollectError::Unauthorized
        ));
        assert!(matches!(
            CollectError::from_status(StatusCode::BAD_GATEWAY),
            CollectError::RemoteApi { status } if status == StatusCode::BAD_GATEWAY
        ));
    }

    #[test]
    fn test_messages_match_user_facing_text() {
        assert_eq!(
            CollectError::RemoteApi { status: StatusCode::INTERNAL_SERVER_ERROR }.to_string(),
            "GitHub API error: 500"
        );
        assert_eq!(
            CollectError::Unauthorized.to_string(),
            "Bad token. Please check your GitHub token."
        );
    }

    #[test]
    fn test_pipeline_error_is_transparent() {
        let err = PipelineError::from(GenerationError::Api("quota exceeded".to_string()));
        assert_eq!(err.to_string(), "quota exceeded");
    }
}
