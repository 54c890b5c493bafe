use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::config::ExtractionConfig;
use crate::error::{InboxError, Result};
use crate::models::{ExtractionRecord, RecordOutcome, SourceFile};
use crate::processing::discovery::discover;
use crate::processing::extractors::Extractors;

/// Result of one extraction pass.
#[derive(Debug, Clone, PartialEq)]
pub enum ExtractionRun {
    /// Nothing was staged; no output was written.
    NoFiles,
    Written(ExtractionSummary),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionSummary {
    pub output_path: PathBuf,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub unsupported: usize,
}

impl ExtractionSummary {
    fn from_records(records: &[ExtractionRecord], output_path: PathBuf) -> Self {
        let count = |status: &str| records.iter().filter(|r| r.status() == status).count();
        Self {
            output_path,
            total: records.len(),
            succeeded: count("success"),
            failed: count("error"),
            unsupported: count("unsupported"),
        }
    }
}

pub struct Aggregator {
    config: ExtractionConfig,
    extractors: Extractors,
}

impl Aggregator {
    pub fn new(config: ExtractionConfig) -> Self {
        let extractors = Extractors::new(config.max_sheet_rows);
        Self { config, extractors }
    }

    /// Discover, extract every staged file, and write the combined JSON.
    pub fn run(&self) -> Result<ExtractionRun> {
        let files = discover(&self.config.staging_dir)?;

        if files.is_empty() {
            tracing::info!(dir = %self.config.staging_dir.display(), "No files found in staging directory");
            return Ok(ExtractionRun::NoFiles);
        }

        let records = self.extract_all(&files);
        let output_path =
            resolve_output_path(&self.config.output_path, &self.config.fallback_output_path);
        write_records(&records, &output_path)?;

        let summary = ExtractionSummary::from_records(&records, output_path);
        tracing::info!(
            total = summary.total,
            succeeded = summary.succeeded,
            failed = summary.failed,
            unsupported = summary.unsupported,
            "Extracted {} file(s) -> {}",
            summary.total,
            summary.output_path.display()
        );

        Ok(ExtractionRun::Written(summary))
    }

    pub fn extract_all(&self, files: &[SourceFile]) -> Vec<ExtractionRecord> {
        files.iter().map(|file| self.extract_one(file)).collect()
    }

    /// Never fails: parse errors become an `error` record.
    pub fn extract_one(&self, file: &SourceFile) -> ExtractionRecord {
        tracing::info!(path = %file.path.display(), "Processing");

        let outcome = match file.kind() {
            Some(kind) => match self.extractors.extract(kind, &file.path) {
                Ok(extracted) => RecordOutcome::Success { extracted },
                Err(e) => {
                    tracing::warn!(path = %file.path.display(), error = %e, "Extraction failed");
                    RecordOutcome::Error {
                        error: e.to_string(),
                    }
                }
            },
            None => RecordOutcome::unsupported(&file.extension),
        };

        ExtractionRecord::new(file, outcome)
    }
}

/// Use `fallback` only when the parent directory of `primary` is missing.
pub fn resolve_output_path(primary: &Path, fallback: &Path) -> PathBuf {
    match primary.parent() {
        Some(parent) if parent.as_os_str().is_empty() || parent.exists() => primary.to_path_buf(),
        None => primary.to_path_buf(),
        Some(parent) => {
            tracing::debug!(
                parent = %parent.display(),
                fallback = %fallback.display(),
                "Primary output directory missing, using fallback"
            );
            fallback.to_path_buf()
        }
    }
}

/// Pretty-printed UTF-8 JSON; non-ASCII text is written as-is.
pub fn write_records(records: &[ExtractionRecord], path: &Path) -> Result<()> {
    let output_error = |source| InboxError::Output {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(output_error)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, records)?;
    writer.flush().map_err(output_error)?;
    Ok(())
}
