use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{InboxError, Result};
use crate::models::SourceFile;

/// Placeholder that keeps the staging directory under version control.
pub const SENTINEL_FILENAME: &str = ".gitkeep";

/// Every regular file under `dir`, excluding the sentinel.
///
/// A missing directory yields an empty list. Entries are sorted by name
/// within each directory.
pub fn discover(dir: &Path) -> Result<Vec<SourceFile>> {
    if !dir.exists() {
        tracing::warn!(dir = %dir.display(), "Staging directory does not exist");
        return Ok(Vec::new());
    }

    let root = absolute(dir)?;
    let mut files = Vec::new();

    for entry in WalkDir::new(&root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => {
                return Err(InboxError::Discovery(format!(
                    "Failed to read {}: {e}",
                    root.display()
                )))
            }
            Err(e) => {
                tracing::warn!(error = %e, "Skipping unreadable staging entry");
                continue;
            }
        };

        if entry.file_name() == SENTINEL_FILENAME || !entry.path().is_file() {
            continue;
        }

        let size_bytes = match std::fs::metadata(entry.path()) {
            Ok(metadata) => metadata.len(),
            Err(e) => {
                tracing::warn!(path = %entry.path().display(), error = %e, "Skipping file without metadata");
                continue;
            }
        };

        files.push(SourceFile::new(entry.into_path(), size_bytes));
    }

    Ok(files)
}

fn absolute(dir: &Path) -> Result<PathBuf> {
    if dir.is_absolute() {
        Ok(dir.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(dir))
    }
}
