use std::path::Path;

use crate::error::Result;
use crate::models::{DocumentKind, ExtractedContent};

pub mod pdf;
pub mod pptx;
pub mod xlsx;

pub use pdf::PdfExtractor;
pub use pptx::PptxExtractor;
pub use xlsx::XlsxExtractor;

/// Extractor set resolved once per run; dispatch is by [`DocumentKind`].
pub struct Extractors {
    xlsx: XlsxExtractor,
}

impl Extractors {
    pub fn new(max_sheet_rows: usize) -> Self {
        Self {
            xlsx: XlsxExtractor::new(max_sheet_rows),
        }
    }

    pub fn extract(&self, kind: DocumentKind, path: &Path) -> Result<ExtractedContent> {
        match kind {
            DocumentKind::Pptx => PptxExtractor::extract_file(path).map(ExtractedContent::Pptx),
            DocumentKind::Xlsx => self.xlsx.extract_file(path).map(ExtractedContent::Xlsx),
            DocumentKind::Pdf => PdfExtractor::extract_file(path).map(ExtractedContent::Pdf),
        }
    }
}

impl Default for Extractors {
    fn default() -> Self {
        Self {
            xlsx: XlsxExtractor::default(),
        }
    }
}
