//! Thin process wrappers around the extraction output: prompt assembly, the
//! external analysis tool, git, and file staging.

pub mod analyzer;
pub mod git;
pub mod prompt;

mod orchestrator;

pub use analyzer::Analyzer;
pub use git::{CommitOutcome, Git};
pub use orchestrator::{stage_files, AnalyzeOptions, Orchestrator, PipelineOutcome};
pub use prompt::{build_prompt, load_prompt, PromptKind};
