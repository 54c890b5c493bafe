use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum InboxError {
    #[error("Processing error: {0}")]
    Processing(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Discovery error: {0}")]
    Discovery(String),

    #[error("Failed to write output to {}: {source}", path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{step} exited with code {code}")]
    Command { step: String, code: i32 },

    #[error("Git error: {0}")]
    Git(String),
}

impl InboxError {
    /// Process exit code to surface for this error.
    ///
    /// A failed external step propagates its own exit code so that scheduled
    /// callers see the same status the tool reported.
    pub fn exit_code(&self) -> i32 {
        match self {
            InboxError::Command { code, .. } if *code != 0 => *code,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, InboxError>;
