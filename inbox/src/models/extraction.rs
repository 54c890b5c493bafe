use serde::{Deserialize, Serialize};

use super::SourceFile;

/// Per-file outcome written to the extraction output.
///
/// Serializes as a flat object: the file attributes followed by `status` and
/// exactly one of `extracted`, `error` or `note`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExtractionRecord {
    pub filename: String,
    pub path: String,
    pub size_bytes: u64,
    pub extension: String,
    #[serde(flatten)]
    pub outcome: RecordOutcome,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RecordOutcome {
    Success { extracted: ExtractedContent },
    Error { error: String },
    Unsupported { note: String },
}

impl RecordOutcome {
    pub fn status(&self) -> &'static str {
        match self {
            Self::Success { .. } => "success",
            Self::Error { .. } => "error",
            Self::Unsupported { .. } => "unsupported",
        }
    }

    pub fn unsupported(extension: &str) -> Self {
        Self::Unsupported {
            note: format!("No extractor for {extension}. File will be classified by filename."),
        }
    }
}

impl ExtractionRecord {
    pub fn new(source: &SourceFile, outcome: RecordOutcome) -> Self {
        Self {
            filename: source.filename.clone(),
            path: source.path.display().to_string(),
            size_bytes: source.size_bytes,
            extension: source.extension.clone(),
            outcome,
        }
    }

    pub fn status(&self) -> &'static str {
        self.outcome.status()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ExtractedContent {
    Pptx(SlideDeck),
    Xlsx(Spreadsheet),
    Pdf(PageDocument),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SlideDeck {
    pub slide_count: usize,
    pub slides: Vec<SlideContent>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SlideContent {
    /// 1-based position in the deck, kept when empty slides are dropped.
    pub slide_number: usize,
    pub content: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Spreadsheet {
    pub sheet_count: usize,
    pub sheets: Vec<SheetContent>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SheetContent {
    pub sheet_name: String,
    /// Retained rows, not rows examined.
    pub row_count: usize,
    pub truncated: bool,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PageDocument {
    pub page_count: usize,
    pub pages: Vec<PageContent>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PageContent {
    pub page_number: usize,
    pub content: String,
}
