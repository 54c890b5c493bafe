use std::path::{Path, PathBuf};
use std::process::Command;

use chrono::Utc;

use crate::error::{InboxError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Nothing was staged, so no commit was attempted.
    NoChanges,
    Pushed,
}

/// Thin wrapper over the `git` binary for one repository.
#[derive(Debug, Clone)]
pub struct Git {
    repo_root: PathBuf,
}

impl Git {
    pub fn new(repo_root: impl Into<PathBuf>) -> Self {
        Self {
            repo_root: repo_root.into(),
        }
    }

    pub fn add(&self, pathspec: &Path) -> Result<()> {
        let pathspec = pathspec.to_string_lossy();
        self.run(&["add", "--", &*pathspec])
    }

    pub fn add_all(&self) -> Result<()> {
        self.run(&["add", "-A"])
    }

    /// `git diff --cached --quiet` exits 1 when the index differs from HEAD.
    pub fn has_staged_changes(&self) -> Result<bool> {
        let status = Command::new("git")
            .args(["diff", "--cached", "--quiet"])
            .current_dir(&self.repo_root)
            .status()
            .map_err(|e| InboxError::Git(format!("Failed to run git diff: {e}")))?;

        match status.code() {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            code => Err(InboxError::Git(format!(
                "git diff --cached exited with {code:?}"
            ))),
        }
    }

    pub fn commit(&self, message: &str) -> Result<()> {
        self.run(&["commit", "-m", message])
    }

    pub fn push(&self) -> Result<()> {
        self.run(&["push"])
    }

    /// Stage everything, then commit and push only when something changed.
    pub fn commit_and_push(&self, model: &str) -> Result<CommitOutcome> {
        self.add_all()?;

        if !self.has_staged_changes()? {
            tracing::info!("No changes to commit");
            return Ok(CommitOutcome::NoChanges);
        }

        self.commit(&commit_message(model))?;
        self.push()?;
        tracing::info!("Pushed analysis results");
        Ok(CommitOutcome::Pushed)
    }

    fn run(&self, args: &[&str]) -> Result<()> {
        tracing::debug!(?args, "git");
        let status = Command::new("git")
            .args(args)
            .current_dir(&self.repo_root)
            .status()
            .map_err(|e| InboxError::Git(format!("Failed to run git {}: {e}", args[0])))?;

        if status.success() {
            Ok(())
        } else {
            Err(InboxError::Command {
                step: format!("git {}", args[0]),
                code: status.code().unwrap_or(1),
            })
        }
    }
}

pub fn commit_message(model: &str) -> String {
    format!(
        "auto: analyze and classify inbox files\n\nModel: {model}\nAnalyzed at: {}",
        Utc::now().format("%Y-%m-%dT%H:%M:%SZ")
    )
}
