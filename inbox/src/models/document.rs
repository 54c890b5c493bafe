use std::path::{Path, PathBuf};

/// Document families with a registered extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pptx,
    Xlsx,
    Pdf,
}

impl DocumentKind {
    /// Resolve the extractor for a lowercase extension including the leading dot.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            ".pptx" => Some(Self::Pptx),
            ".xlsx" | ".xlsm" => Some(Self::Xlsx),
            ".pdf" => Some(Self::Pdf),
            _ => None,
        }
    }
}

/// A regular file found in the staging directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub filename: String,
    pub path: PathBuf,
    pub size_bytes: u64,
    /// Lowercase, with the leading dot. Empty when the name has no extension.
    pub extension: String,
}

impl SourceFile {
    pub fn new(path: PathBuf, size_bytes: u64) -> Self {
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let extension = extension_of(&path);
        Self {
            filename,
            path,
            size_bytes,
            extension,
        }
    }

    pub fn kind(&self) -> Option<DocumentKind> {
        DocumentKind::from_extension(&self.extension)
    }
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|e| format!(".{}", e.to_string_lossy().to_lowercase()))
        .unwrap_or_default()
}
