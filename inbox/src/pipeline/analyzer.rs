use std::io::{ErrorKind, Write};
use std::path::Path;
use std::process::{Command, Stdio};

use crate::error::{InboxError, Result};

/// External command-line analysis tool fed the assembled prompt on stdin.
#[derive(Debug, Clone)]
pub struct Analyzer {
    bin: String,
    model: String,
    max_turns: u32,
}

impl Analyzer {
    pub fn new(bin: impl Into<String>, model: impl Into<String>, max_turns: u32) -> Self {
        Self {
            bin: bin.into(),
            model: model.into(),
            max_turns,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn args(&self) -> Vec<String> {
        vec![
            "-p".to_string(),
            "-".to_string(),
            "--model".to_string(),
            self.model.clone(),
            "--max-turns".to_string(),
            self.max_turns.to_string(),
        ]
    }

    /// Run the tool in `cwd`. A non-zero exit becomes [`InboxError::Command`].
    pub fn run(&self, prompt: &str, cwd: &Path) -> Result<()> {
        tracing::info!(model = %self.model, max_turns = self.max_turns, "Running analysis");

        let mut child = Command::new(&self.bin)
            .args(self.args())
            .current_dir(cwd)
            .stdin(Stdio::piped())
            .spawn()
            .map_err(|e| {
                InboxError::Config(format!("Failed to start analyzer '{}': {e}", self.bin))
            })?;

        // stdin is closed at the end of this block so the tool sees EOF
        if let Some(mut stdin) = child.stdin.take() {
            if let Err(e) = stdin.write_all(prompt.as_bytes()) {
                if e.kind() != ErrorKind::BrokenPipe {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(e.into());
                }
                tracing::warn!("Analyzer exited before reading the whole prompt");
            }
        }

        let status = child.wait()?;
        if status.success() {
            Ok(())
        } else {
            Err(InboxError::Command {
                step: "analysis".to_string(),
                code: status.code().unwrap_or(1),
            })
        }
    }
}
