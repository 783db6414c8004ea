// src/generate/prompt.rs
// =============================================================================
// The fixed instructions sent to the model ahead of the repository text.
// =============================================================================

/// Sections every generated README must contain, in the order requested.
pub const REQUIRED_SECTIONS: &[&str] = &[
    "Project Title",
    "Description",
    "Features",
    "Installation Guide",
    "Tech Stack",
    "Project Structure",
    "License Information",
];

const PREAMBLE: &str = "You are an expert in creating professional README.md files for GitHub repositories.
Based on the following information, generate a comprehensive and well-formatted README.md file using Markdown. Do not include any extra text before or after the markdown content.
The generated README should include all of the following sections:";

const DATA_MARKER: &str = " \n\n\n This is the repo data ";

/// Builds the full prompt: instructions, section list, then the aggregate verbatim.
pub fn build_prompt(aggregate: &str) -> String {
    let mut prompt = String::with_capacity(PREAMBLE.len() + aggregate.len() + 256);
    prompt.push_str(PREAMBLE);

    for section in REQUIRED_SECTIONS {
        prompt.push_str("\n- ");
        prompt.push_str(section);
    }

    prompt.push_str(DATA_MARKER);
    prompt.push_str(aggregate);
    prompt
}
