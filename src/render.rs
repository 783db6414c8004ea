// src/render.rs
// =============================================================================
// Presents the generated README.
//
// - render: Markdown as-is, or HTML through pulldown-cmark
// - section_report: which of the requested README sections the model wrote
// - publish: prints or writes the result, but only for a successful run
//
// Like the link extractor this module started from, headings are found by
// walking pulldown-cmark's event stream rather than by matching '#' lines,
// so headings inside code blocks are ignored.
// =============================================================================

use anyhow::{Context, Result};
use clap::ValueEnum;
use pulldown_cmark::{html, Event, HeadingLevel, Options, Parser, Tag};
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::generate::REQUIRED_SECTIONS;
use crate::pipeline::{Outcome, Report};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Markdown,
    Html,
}

/// Whether one requested section shows up in the README.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionStatus {
    pub section: &'static str,
    pub present: bool,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    #[serde(flatten)]
    report: &'a Report,
    sections: Vec<SectionStatus>,
}

/// Renders `markdown` in the requested format.
pub fn render(markdown: &str, format: OutputFormat) -> String {
    let markdown = strip_wrapping_fence(markdown);

    match format {
        OutputFormat::Markdown => markdown.to_string(),
        OutputFormat::Html => {
            let mut options = Options::empty();
            options.insert(Options::ENABLE_TABLES);
            options.insert(Options::ENABLE_STRIKETHROUGH);
            options.insert(Options::ENABLE_TASKLISTS);

            let mut out = String::with_capacity(markdown.len() * 3 / 2);
            html::push_html(&mut out, Parser::new_ext(markdown, options));
            out
        }
    }
}

/// Checks the README's headings against the sections the prompt asks for.
pub fn section_report(markdown: &str) -> Vec<SectionStatus> {
    let headings = headings(strip_wrapping_fence(markdown));

    REQUIRED_SECTIONS
        .iter()
        .map(|&section| SectionStatus {
            section,
            present: headings
                .iter()
                .any(|(level, text)| heading_matches(section, *level, text)),
        })
        .collect()
}

/// Prints or writes a successful run. Failed runs write nothing, so an
/// existing output file is left untouched.
pub fn publish(
    outcome: &Outcome,
    format: OutputFormat,
    json: bool,
    target: Option<&Path>,
) -> Result<()> {
    let report = match outcome {
        Outcome::Done(report) => report,
        Outcome::Failed { .. } => {
            debug!("run failed, nothing to publish");
            return Ok(());
        }
    };

    let sections = section_report(&report.readme);
    let missing: Vec<&str> = sections
        .iter()
        .filter(|s| !s.present)
        .map(|s| s.section)
        .collect();
    if !missing.is_empty() {
        warn!(missing = ?missing, "generated README is missing requested sections");
    }

    let body = if json {
        serde_json::to_string_pretty(&JsonReport { report, sections })?
    } else {
        render(&report.readme, format)
    };

    write_output(target, &body)
}

/// Writes `body` to `target`, or to stdout when there is no target.
pub fn write_output(target: Option<&Path>, body: &str) -> Result<()> {
    match target {
        Some(path) => {
            fs::write(path, body).with_context(|| format!("Failed to write {}", path.display()))?;
            info!(path = %path.display(), bytes = body.len(), "output written");
        }
        None => {
            if body.ends_with('\n') {
                print!("{}", body);
            } else {
                println!("{}", body);
            }
        }
    }
    Ok(())
}

// Models sometimes wrap the whole answer in ```markdown ... ``` despite being
// asked not to. Only a fence around the entire text is removed.
fn strip_wrapping_fence(markdown: &str) -> &str {
    let trimmed = markdown.trim();

    let Some(rest) = trimmed.strip_prefix("```") else {
        return markdown;
    };
    let Some((info, body)) = rest.split_once('\n') else {
        return markdown;
    };
    if !matches!(info.trim(), "" | "markdown" | "md") {
        return markdown;
    }
    match body.trim_end().strip_suffix("```") {
        // A fence inside the body means the outer pair isn't a wrapper
        Some(inner) if !inner.contains("\n```") => inner.trim_end_matches('\n'),
        _ => markdown,
    }
}

// Collects (level, text) for every heading
fn headings(markdown: &str) -> Vec<(HeadingLevel, String)> {
    let mut found = Vec::new();
    let mut current: Option<(HeadingLevel, String)> = None;

    for event in Parser::new(markdown) {
        match event {
            Event::Start(Tag::Heading(level, _, _)) => {
                current = Some((level, String::new()));
            }
            Event::Text(text) | Event::Code(text) => {
                if let Some((_, buf)) = current.as_mut() {
                    buf.push_str(&text);
                }
            }
            Event::End(Tag::Heading(..)) => {
                if let Some(heading) = current.take() {
                    found.push(heading);
                }
            }
            _ => {}
        }
    }

    found
}

// Section titles are instructions, not literal headings: the title section
// is any top-level heading, the others are matched by keyword.
fn heading_matches(section: &str, level: HeadingLevel, text: &str) -> bool {
    let text = text.to_lowercase();
    let keywords: &[&str] = match section {
        "Project Title" => return level == HeadingLevel::H1,
        "Description" => &["description", "about", "overview", "introduction"],
        "Features" => &["feature"],
        "Installation Guide" => &["install", "getting started", "setup"],
        "Tech Stack" => &["tech", "stack", "built with", "technolog"],
        "Project Structure" => &["structure", "layout", "directory"],
        "License Information" => &["license", "licence"],
        other => return text.contains(&other.to_lowercase()),
    };
    keywords.iter().any(|k| text.contains(k))
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why walk pulldown-cmark events instead of looking for '#' lines?
//    - A '#' inside a fenced code block is not a heading
//    - The parser already knows where code blocks start and end
//
// 2. What is `current.take()`?
//    - It moves the value out of the Option and leaves None behind, so the
//      finished heading can be pushed without cloning it
//
// 3. Why does publish take the whole Outcome?
//    - Matching on Done is the only way to reach the README text, so a
//      failed run has nothing it could write
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{GenerationError, PipelineError};
    use crate::github::{AccessMode, RepoId};
    use crate::pipeline::Stage;

    const README: &str = "# Hello World

A tiny demo.

## Description
Says hello.

## ✨ Features
- greets

## Installation Guide
```bash
# not a heading
cargo install hello
```

## Tech Stack
Rust

## License
MIT
";

    fn done(readme: &str) -> Outcome {
        Outcome::Done(Report {
            repo: RepoId {
                owner: "octocat".to_string(),
                name: "hello-world".to_string(),
                access: AccessMode::Public,
            },
            files: 2,
            aggregate_bytes: 10,
            readme: readme.to_string(),
        })
    }

    #[test]
    fn test_section_report() {
        let report = section_report(README);
        let missing: Vec<&str> = report.iter().filter(|s| !s.present).map(|s| s.section).collect();
        assert_eq!(missing, vec!["Project Structure"]);
    }

    #[test]
    fn test_code_block_comments_are_not_headings() {
        let found = headings(README);
        assert!(found.iter().all(|(_, text)| text != "not a heading"));
        assert_eq!(found[0], (HeadingLevel::H1, "Hello World".to_string()));
    }

    #[test]
    fn test_render_html() {
        let html = render("# Title\n\n| a | b |\n|---|---|\n| 1 | 2 |\n", OutputFormat::Html);
        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.contains("<table>"));
    }

    #[test]
    fn test_render_markdown_is_verbatim() {
        assert_eq!(render(README, OutputFormat::Markdown), README);
    }

    #[test]
    fn test_strip_wrapping_fence() {
        assert_eq!(
            render("```markdown\n# Title\n\nBody\n```\n", OutputFormat::Markdown),
            "# Title\n\nBody"
        );
        // Fences inside the README stay where they are
        let inner = "```bash\nls\n```";
        assert_eq!(strip_wrapping_fence(inner), inner);
        let two_blocks = "```\na\n```\n\ntext\n\n```\nb\n```";
        assert_eq!(strip_wrapping_fence(two_blocks), two_blocks);
    }

    #[test]
    fn test_publish_writes_successful_run() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("README.md");

        publish(&done("# Hi\n"), OutputFormat::Markdown, false, Some(&path)).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "# Hi\n");
    }

    #[test]
    fn test_failed_run_keeps_previous_readme() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("README.md");
        fs::write(&path, "# Previous\n").unwrap();

        let failed = Outcome::Failed {
            stage: Stage::Generating,
            error: PipelineError::Generate(GenerationError::Api("boom".to_string())),
        };
        publish(&failed, OutputFormat::Markdown, false, Some(&path)).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "# Previous\n");
    }

    #[test]
    fn test_publish_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");

        publish(&done(README), OutputFormat::Markdown, true, Some(&path)).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["repo"]["owner"], "octocat");
        assert_eq!(value["repo"]["access"], "public");
        assert_eq!(value["files"], 2);
        assert_eq!(value["sections"].as_array().unwrap().len(), REQUIRED_SECTIONS.len());
    }
}
