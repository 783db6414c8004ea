// src/generate/mod.rs
// =============================================================================
// This module turns a repository aggregate into README Markdown.
//
// Submodules:
// - prompt: the fixed instructions placed in front of the aggregate
// - gemini: the HTTP client for the generation endpoint
// =============================================================================

mod gemini;
mod prompt;

use tracing::info;

use crate::error::GenerationError;

pub use gemini::{GeminiClient, TextGenerator};
pub use prompt::REQUIRED_SECTIONS;

/// Asks `generator` for a README describing `aggregate`.
///
/// One request, no retries. Oversized aggregates are sent as-is and any
/// rejection comes back as the service's own error message.
pub async fn generate_readme<G>(generator: &G, aggregate: &str) -> Result<String, GenerationError>
where
    G: TextGenerator + ?Sized,
{
    let prompt = prompt::build_prompt(aggregate);
    info!(prompt_bytes = prompt.len(), "generating README");

    let readme = generator.generate(&prompt).await?;

    info!(readme_bytes = readme.len(), "README generated");
    Ok(readme)
}
