use std::path::Path;

use pdf_extract::{Document, PlainTextOutput};

use crate::error::{InboxError, Result};
use crate::models::{PageContent, PageDocument};

pub struct PdfExtractor;

impl PdfExtractor {
    pub fn extract_file(path: &Path) -> Result<PageDocument> {
        let bytes = std::fs::read(path)?;
        Self::extract(&bytes)
    }

    pub fn extract(bytes: &[u8]) -> Result<PageDocument> {
        // pdf-extract can panic on malformed fonts and glyph tables
        match std::panic::catch_unwind(|| Self::extract_pages(bytes)) {
            Ok(result) => result,
            Err(_) => Err(InboxError::Processing(
                "PDF extraction panicked - likely contains malformed fonts".to_string(),
            )),
        }
    }

    /// Walk every page listed in the page tree. A page that fails to render
    /// fails the document rather than truncating it.
    fn extract_pages(bytes: &[u8]) -> Result<PageDocument> {
        let mut doc = Document::load_mem(bytes)
            .map_err(|e| InboxError::Processing(format!("PDF extraction failed: {e}")))?;
        if doc.is_encrypted() {
            doc.decrypt("")
                .map_err(|e| InboxError::Processing(format!("PDF is encrypted: {e}")))?;
        }

        let page_numbers: Vec<u32> = doc.get_pages().into_keys().collect();
        let mut pages = Vec::with_capacity(page_numbers.len());

        for page_number in page_numbers {
            let mut text = String::new();
            {
                let mut output = PlainTextOutput::new(&mut text);
                pdf_extract::output_doc_page(&doc, &mut output, page_number).map_err(|e| {
                    InboxError::Processing(format!(
                        "PDF extraction failed on page {page_number}: {e}"
                    ))
                })?;
            }
            pages.push(text);
        }

        Ok(Self::collect_pages(pages))
    }

    /// Keep non-empty pages, numbered by their position in the source.
    pub fn collect_pages<I>(pages: I) -> PageDocument
    where
        I: IntoIterator<Item = String>,
    {
        let mut page_count = 0;
        let mut retained = Vec::new();

        for (index, text) in pages.into_iter().enumerate() {
            page_count += 1;
            let trimmed = text.trim();
            if trimmed.is_empty() {
                continue;
            }
            retained.push(PageContent {
                page_number: index + 1,
                content: trimmed.to_string(),
            });
        }

        tracing::debug!(page_count, retained = retained.len(), "PDF pages extracted");

        PageDocument {
            page_count,
            pages: retained,
        }
    }
}
