//! Prompt assembly for the analysis step.
//!
//! The instruction template lives on disk; the extraction output is appended
//! verbatim in a fenced `json` block so the analysis tool can read it as
//! structured context.

use std::path::Path;

use crate::error::{InboxError, Result};

/// Heading placed above the appended extraction output.
pub const EXTRACTED_DATA_HEADING: &str = "## Extracted text data";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    /// Full analysis: classify, summarize and file each document.
    Analyze,
    /// Dry run: classification only.
    ClassifyOnly,
}

impl PromptKind {
    pub fn for_run(dry_run: bool) -> Self {
        if dry_run {
            Self::ClassifyOnly
        } else {
            Self::Analyze
        }
    }

    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Analyze => "analyze-file.txt",
            Self::ClassifyOnly => "classify-only.txt",
        }
    }
}

/// Append the extraction JSON to an instruction template.
///
/// # Example
/// ```
/// use inbox::pipeline::prompt::build_prompt;
///
/// let prompt = build_prompt("Classify these files.", Some("[]"));
/// assert!(prompt.ends_with("```json\n[]\n```"));
/// ```
pub fn build_prompt(template: &str, extracted_json: Option<&str>) -> String {
    match extracted_json {
        Some(data) => format!(
            "{template}\n\n---\n{EXTRACTED_DATA_HEADING}\n\n```json\n{data}\n```"
        ),
        None => template.to_string(),
    }
}

/// Read the template for `kind` from `prompts_dir` and attach the extraction
/// output at `extracted_path`, when there is one.
pub fn load_prompt(
    prompts_dir: &Path,
    kind: PromptKind,
    extracted_path: Option<&Path>,
) -> Result<String> {
    let template_path = prompts_dir.join(kind.file_name());
    let template = std::fs::read_to_string(&template_path).map_err(|e| {
        InboxError::Config(format!(
            "Failed to read prompt template {}: {e}",
            template_path.display()
        ))
    })?;

    let extracted = match extracted_path {
        Some(path) if path.exists() => Some(std::fs::read_to_string(path)?),
        _ => None,
    };

    Ok(build_prompt(&template, extracted.as_deref()))
}
