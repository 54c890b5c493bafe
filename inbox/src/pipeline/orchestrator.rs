use std::path::{Path, PathBuf};

use crate::config::{Config, ExtractionConfig};
use crate::error::{InboxError, Result};
use crate::pipeline::analyzer::Analyzer;
use crate::pipeline::git::{CommitOutcome, Git};
use crate::pipeline::prompt::{load_prompt, PromptKind};
use crate::processing::{discover, Aggregator, ExtractionRun};

#[derive(Debug, Clone, Default)]
pub struct AnalyzeOptions {
    /// Classification only: one turn, no commit.
    pub dry_run: bool,
    pub model: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutcome {
    NoFiles,
    DryRun,
    Committed(CommitOutcome),
}

/// Runs extraction → prompt → analysis → commit for one staging directory.
///
/// Each step aborts the run on failure; the commit step only runs after
/// extraction and analysis both succeeded.
pub struct Orchestrator {
    config: Config,
}

impl Orchestrator {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Extraction settings with paths anchored at the repository root.
    pub fn extraction_config(&self) -> ExtractionConfig {
        let extraction = &self.config.extraction;
        ExtractionConfig {
            staging_dir: self.config.staging_dir(),
            output_path: extraction.output_path.clone(),
            fallback_output_path: self.local_output_path(),
            max_sheet_rows: extraction.max_sheet_rows,
        }
    }

    fn local_output_path(&self) -> PathBuf {
        self.config
            .repo_root
            .join(&self.config.extraction.fallback_output_path)
    }

    pub fn run(&self, options: &AnalyzeOptions) -> Result<PipelineOutcome> {
        let repo_root = &self.config.repo_root;
        let staging_dir = self.config.staging_dir();

        let files = discover(&staging_dir)?;
        if files.is_empty() {
            tracing::info!(
                dir = %staging_dir.display(),
                "No files in staging directory. Add files with `inbox add <file>...`"
            );
            return Ok(PipelineOutcome::NoFiles);
        }
        for file in &files {
            tracing::info!(file = %file.filename, "Staged");
        }

        tracing::info!("Step 1: text extraction");
        let extracted_path = match Aggregator::new(self.extraction_config()).run()? {
            ExtractionRun::Written(summary) => summary.output_path,
            ExtractionRun::NoFiles => return Ok(PipelineOutcome::NoFiles),
        };

        let kind = PromptKind::for_run(options.dry_run);
        tracing::info!(prompt = kind.file_name(), "Step 2: prompt assembly");
        let prompt_dir = repo_root.join(&self.config.analysis.prompts_dir);
        let prompt = load_prompt(&prompt_dir, kind, Some(&extracted_path))?;

        let analysis_config = &self.config.analysis;
        let model = analysis_config.resolve_model(
            options.model.as_deref().unwrap_or(&analysis_config.model),
        );
        let max_turns = if options.dry_run {
            1
        } else {
            analysis_config.max_turns
        };
        let analyzer = Analyzer::new(&analysis_config.analyzer_bin, model, max_turns);

        tracing::info!("Step 3: analysis");
        let analysis = analyzer.run(&prompt, repo_root);
        self.remove_local_output();
        if let Err(e) = analysis {
            tracing::error!(error = %e, "Analysis failed");
            return Err(e);
        }

        if options.dry_run {
            return Ok(PipelineOutcome::DryRun);
        }

        tracing::info!("Step 4: commit and push");
        let outcome = Git::new(repo_root).commit_and_push(analyzer.model())?;
        Ok(PipelineOutcome::Committed(outcome))
    }

    /// The working-directory copy must not end up in the commit.
    fn remove_local_output(&self) {
        let local = self.local_output_path();
        if local.exists() {
            if let Err(e) = std::fs::remove_file(&local) {
                tracing::warn!(path = %local.display(), error = %e, "Failed to remove extraction output");
            }
        }
    }
}

/// Copy `files` into the staging directory and stage them in git.
///
/// Returns the staged file names. Fails before copying anything if one of
/// the sources is missing.
pub fn stage_files(config: &Config, files: &[PathBuf]) -> Result<Vec<String>> {
    if let Some(missing) = files.iter().find(|f| !f.is_file()) {
        return Err(InboxError::NotFound(missing.display().to_string()));
    }

    let staging_dir = config.staging_dir();
    std::fs::create_dir_all(&staging_dir)?;

    let mut names = Vec::with_capacity(files.len());
    for source in files {
        let name = source
            .file_name()
            .ok_or_else(|| InboxError::NotFound(source.display().to_string()))?;
        std::fs::copy(source, staging_dir.join(name))?;

        let name = name.to_string_lossy().into_owned();
        tracing::info!(file = %name, "Added");
        names.push(name);
    }

    Git::new(&config.repo_root).add(Path::new(&config.extraction.staging_dir))?;
    Ok(names)
}
