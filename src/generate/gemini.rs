// src/generate/gemini.rs
// =============================================================================
// Client for Gemini's generateContent endpoint.
//
// Request:
//   POST {api}/v1beta/models/{model}:generateContent?key={api_key}
//   {"contents":[{"parts":[{"text":"..."}]}]}
//
// Response (success):
//   {"candidates":[{"content":{"parts":[{"text":"# My Project ..."}]}}]}
//
// Response (failure):
//   {"error":{"code":400,"message":"...","status":"INVALID_ARGUMENT"}}
//
// Only the first candidate's first text part is used.
// =============================================================================

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use crate::config::GeminiSettings;
use crate::error::GenerationError;

const FALLBACK_MESSAGE: &str = "Gemini API error";

/// Anything that can turn a prompt into text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

impl<'a> GenerateRequest<'a> {
    fn single(text: &'a str) -> Self {
        Self {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text }],
            }],
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    candidates: Option<Vec<Candidate>>,
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
}

/// reqwest-backed Gemini client.
pub struct GeminiClient {
    client: Client,
    endpoint: Url,
    model: String,
}

impl GeminiClient {
    pub fn new(settings: &GeminiSettings) -> Result<Self, GenerationError> {
        let client = Client::builder().timeout(settings.timeout).build()?;

        Ok(Self {
            client,
            endpoint: endpoint_url(&settings.api_url, &settings.model, &settings.api_key),
            model: settings.model.clone(),
        })
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        // The endpoint carries the key, so only the model is logged
        debug!(model = %self.model, prompt_bytes = prompt.len(), "sending generation request");

        let response = self
            .client
            .post(self.endpoint.clone())
            .json(&GenerateRequest::single(prompt))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        parse_response(status, &body)
    }
}

/// Builds the generateContent URL for `model`, with the key as a query parameter.
pub fn endpoint_url(api_url: &Url, model: &str, api_key: &str) -> Url {
    let mut url = api_url.clone();
    let method = format!("{model}:generateContent");

    if let Ok(mut segments) = url.path_segments_mut() {
        segments
            .pop_if_empty()
            .extend(["v1beta", "models", method.as_str()]);
    }
    url.query_pairs_mut().append_pair("key", api_key);

    url
}

/// Extracts the first candidate's text, or the service's error message.
pub fn parse_response(status: StatusCode, body: &str) -> Result<String, GenerationError> {
    let parsed: GenerateResponse = match serde_json::from_str(body) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!(status = status.as_u16(), error = %e, "generation response is not JSON");
            return Err(GenerationError::Api(format!(
                "{FALLBACK_MESSAGE} (HTTP {})",
                status.as_u16()
            )));
        }
    };

    let api_message = || {
        parsed
            .error
            .as_ref()
            .and_then(|e| e.message.clone())
            .unwrap_or_else(|| FALLBACK_MESSAGE.to_string())
    };

    if !status.is_success() {
        warn!(status = status.as_u16(), "generation request failed");
        return Err(GenerationError::Api(api_message()));
    }

    parsed
        .candidates
        .as_ref()
        .and_then(|candidates| candidates.first())
        .and_then(|candidate| candidate.content.as_ref())
        .and_then(|content| content.parts.first())
        .and_then(|part| part.text.clone())
        .ok_or_else(|| GenerationError::Api(api_message()))
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why do the request structs borrow (`&'a str`)?
//    - The prompt can be large; serde serializes straight from the borrow
//    - The lifetime 'a ties the request to the prompt it points at
//
// 2. Why is every response field an Option?
//    - A success body may have no candidates and an error body has no
//      candidates at all, so each level is checked with and_then
//
// 3. What does `.await?` do here?
//    - It waits for the response, then converts a reqwest::Error into a
//      GenerationError through the From impl in error.rs
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_url() {
        let base = Url::parse("https://generativelanguage.googleapis.com").unwrap();
        let url = endpoint_url(&base, "gemini-1.5-flash", "secret");
        assert_eq!(
            url.as_str(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent?key=secret"
        );
    }

    #[test]
    fn test_request_body_shape() {
        let body = serde_json::to_value(GenerateRequest::single("hello")).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"contents": [{"parts": [{"text": "hello"}]}]})
        );
    }

    #[test]
    fn test_first_candidate_first_part() {
        let body = r##"{"candidates": [
            {"content": {"parts": [{"text": "# Title"}, {"text": "ignored"}]}},
            {"content": {"parts": [{"text": "second candidate"}]}}
        ]}"##;
        assert_eq!(parse_response(StatusCode::OK, body).unwrap(), "# Title");
    }

    #[test]
    fn test_error_message_is_surfaced() {
        let body = r#"{"error": {"code": 400, "message": "API key not valid.", "status": "INVALID_ARGUMENT"}}"#;
        let err = parse_response(StatusCode::BAD_REQUEST, body).unwrap_err();
        assert_eq!(err.to_string(), "API key not valid.");
    }

    #[test]
    fn test_success_without_candidates() {
        let err = parse_response(StatusCode::OK, r#"{"promptFeedback": {}}"#).unwrap_err();
        assert!(matches!(err, GenerationError::Api(ref m) if m == "Gemini API error"));

        let err = parse_response(StatusCode::OK, r#"{"candidates": []}"#).unwrap_err();
        assert!(matches!(err, GenerationError::Api(_)));

        let err = parse_response(StatusCode::OK, r#"{"candidates": [{"finishReason": "SAFETY"}]}"#)
            .unwrap_err();
        assert!(matches!(err, GenerationError::Api(_)));
    }

    #[test]
    fn test_non_json_body() {
        let err = parse_response(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>").unwrap_err();
        assert_eq!(err.to_string(), "Gemini API error (HTTP 502)");
    }

    #[tokio::test]
    async fn test_transport_error_hides_api_key() {
        // Bind then drop, so nothing is listening on the port
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let settings = GeminiSettings {
            api_url: Url::parse(&format!("http://127.0.0.1:{port}")).unwrap(),
            api_key: "SECRET_KEY".to_string(),
            model: "gemini-1.5-flash".to_string(),
            timeout: std::time::Duration::from_secs(5),
        };

        let err = GeminiClient::new(&settings)
            .unwrap()
            .generate("hi")
            .await
            .unwrap_err();

        assert!(matches!(err, GenerationError::Transport(_)));
        assert!(!err.to_string().contains("SECRET_KEY"));
        assert!(!format!("{err:?}").contains("SECRET_KEY"));
    }
}
