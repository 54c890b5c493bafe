//! PPTX extractor using zip + quick-xml

use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::{BytesRef, Event};
use quick_xml::Reader;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::Path;
use zip::ZipArchive;

use crate::error::{InboxError, Result};
use crate::models::{SlideContent, SlideDeck};

/// Separator placed between cell texts when a table row becomes one fragment.
pub const CELL_SEPARATOR: &str = " | ";

pub struct PptxExtractor;

impl PptxExtractor {
    pub fn extract_file(path: &Path) -> Result<SlideDeck> {
        let file = File::open(path)?;
        let archive = ZipArchive::new(BufReader::new(file))
            .map_err(|e| InboxError::Processing(format!("PPTX parse error: {e}")))?;
        Self::extract_archive(archive)
    }

    pub fn extract(bytes: &[u8]) -> Result<SlideDeck> {
        let archive = ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| InboxError::Processing(format!("PPTX parse error: {e}")))?;
        Self::extract_archive(archive)
    }

    fn extract_archive<R: Read + Seek>(mut archive: ZipArchive<R>) -> Result<SlideDeck> {
        let slide_order = Self::get_slide_order(&mut archive)?;

        if slide_order.is_empty() {
            return Ok(SlideDeck::default());
        }

        let slide_mapping = Self::get_slide_mapping(&mut archive)?;
        let mut slides = Vec::new();

        for (index, r_id) in slide_order.iter().enumerate() {
            let slide_number = index + 1;

            let slide_path = match slide_mapping.get(r_id) {
                Some(path) => path.clone(),
                None => format!("ppt/slides/slide{slide_number}.xml"),
            };

            let content = match Self::read_file_from_archive(&mut archive, &slide_path) {
                Ok(xml) => Self::extract_slide_fragments(&xml)
                    .map_err(|e| InboxError::Processing(format!("Error parsing {slide_path}: {e}")))?,
                Err(e) => {
                    tracing::debug!(slide = slide_number, error = %e, "Slide part missing, treating as empty");
                    Vec::new()
                }
            };

            if content.is_empty() {
                continue;
            }

            slides.push(SlideContent {
                slide_number,
                content,
            });
        }

        Ok(SlideDeck {
            slide_count: slide_order.len(),
            slides,
        })
    }

    /// Relationship ids of the slides listed in `ppt/presentation.xml`, in deck order.
    fn get_slide_order<R: Read + Seek>(archive: &mut ZipArchive<R>) -> Result<Vec<String>> {
        let xml = Self::read_file_from_archive(archive, "ppt/presentation.xml")?;

        let mut reader = Reader::from_str(&xml);
        reader.config_mut().trim_text(true);

        let mut slide_ids = Vec::new();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Empty(e)) | Ok(Event::Start(e)) => {
                    if e.local_name().as_ref() == b"sldId" {
                        for attr in e.attributes().flatten() {
                            // `id` is also present unprefixed; only the relationship id matters
                            if attr.key.prefix().is_some() && attr.key.local_name().as_ref() == b"id"
                            {
                                if let Ok(val) = std::str::from_utf8(&attr.value) {
                                    slide_ids.push(val.to_string());
                                }
                            }
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(InboxError::Processing(format!(
                        "Error parsing presentation.xml: {e}"
                    )))
                }
                _ => {}
            }
            buf.clear();
        }

        Ok(slide_ids)
    }

    fn get_slide_mapping<R: Read + Seek>(
        archive: &mut ZipArchive<R>,
    ) -> Result<HashMap<String, String>> {
        let xml = match Self::read_file_from_archive(archive, "ppt/_rels/presentation.xml.rels") {
            Ok(xml) => xml,
            Err(_) => return Ok(HashMap::new()),
        };

        let mut reader = Reader::from_str(&xml);
        reader.config_mut().trim_text(true);

        let mut mapping = HashMap::new();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Empty(e)) | Ok(Event::Start(e)) => {
                    if e.local_name().as_ref() == b"Relationship" {
                        let mut id = None;
                        let mut target = None;
                        let mut rel_type = None;

                        for attr in e.attributes().flatten() {
                            let value = std::str::from_utf8(&attr.value).ok().map(String::from);
                            match attr.key.as_ref() {
                                b"Id" => id = value,
                                b"Target" => target = value,
                                b"Type" => rel_type = value,
                                _ => {}
                            }
                        }

                        if let (Some(id), Some(target), Some(rel_type)) = (id, target, rel_type) {
                            if rel_type.ends_with("/slide") {
                                mapping.insert(id, Self::resolve_target(&target));
                            }
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(_) => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(mapping)
    }

    /// Resolve a relationship target from `ppt/_rels` into an archive path.
    fn resolve_target(target: &str) -> String {
        match target.strip_prefix('/') {
            Some(absolute) => absolute.to_string(),
            None => format!("ppt/{}", target.trim_start_matches("./")),
        }
    }

    /// Text fragments of one slide: trimmed paragraphs of top-level text
    /// shapes, then one `" | "`-joined fragment per table row.
    pub fn extract_slide_fragments(xml: &str) -> std::result::Result<Vec<String>, quick_xml::Error> {
        let mut reader = Reader::from_str(xml);
        let mut walker = ShapeTreeWalker::default();
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) => walker.open(e.local_name().as_ref()),
                Event::Empty(e) => walker.empty(e.local_name().as_ref()),
                Event::End(e) => walker.close(e.local_name().as_ref()),
                Event::Text(e) => {
                    if walker.accepts_text() {
                        if let Ok(text) = std::str::from_utf8(e.as_ref()) {
                            walker.push_text(text);
                        }
                    }
                }
                Event::GeneralRef(e) => {
                    if walker.accepts_text() {
                        if let Some(text) = Self::resolve_reference(&e) {
                            walker.push_text(&text);
                        }
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        Ok(walker.fragments)
    }

    fn resolve_reference(reference: &BytesRef<'_>) -> Option<String> {
        if let Ok(Some(ch)) = reference.resolve_char_ref() {
            return Some(ch.to_string());
        }
        let name = reference.decode().ok()?;
        resolve_predefined_entity(&name).map(String::from)
    }

    fn read_file_from_archive<R: Read + Seek>(
        archive: &mut ZipArchive<R>,
        path: &str,
    ) -> Result<String> {
        let mut file = archive
            .by_name(path)
            .map_err(|e| InboxError::Processing(format!("Failed to read {path} from PPTX: {e}")))?;

        let mut content = String::new();
        file.read_to_string(&mut content)
            .map_err(|e| InboxError::Processing(format!("Failed to read {path} content: {e}")))?;

        Ok(content)
    }
}

/// Streaming state for one slide's `p:spTree`.
///
/// Group shapes and `mc:AlternateContent` wrappers are skipped whole, so only
/// top-level shapes contribute text.
#[derive(Default)]
struct ShapeTreeWalker {
    fragments: Vec<String>,
    skip_depth: usize,
    in_text_body: bool,
    in_table: bool,
    in_cell: bool,
    in_paragraph: bool,
    in_text: bool,
    paragraph: String,
    cell_paragraphs: Vec<String>,
    row: Vec<String>,
}

impl ShapeTreeWalker {
    fn is_skipped_container(name: &[u8]) -> bool {
        matches!(name, b"grpSp" | b"AlternateContent")
    }

    fn accepts_text(&self) -> bool {
        self.skip_depth == 0 && self.in_text
    }

    fn push_text(&mut self, text: &str) {
        self.paragraph.push_str(text);
    }

    fn open(&mut self, name: &[u8]) {
        if Self::is_skipped_container(name) {
            self.skip_depth += 1;
            return;
        }
        if self.skip_depth > 0 {
            return;
        }

        match name {
            b"txBody" if !self.in_table => self.in_text_body = true,
            b"tbl" => self.in_table = true,
            b"tr" if self.in_table => self.row.clear(),
            b"tc" if self.in_table => {
                self.in_cell = true;
                self.cell_paragraphs.clear();
            }
            b"p" if self.in_text_body || self.in_cell => {
                self.in_paragraph = true;
                self.paragraph.clear();
            }
            b"t" if self.in_paragraph => self.in_text = true,
            _ => {}
        }
    }

    fn empty(&mut self, name: &[u8]) {
        if self.skip_depth > 0 {
            return;
        }

        match name {
            b"br" if self.in_paragraph => self.paragraph.push('\u{b}'),
            b"tc" if self.in_table => self.row.push(String::new()),
            _ => {}
        }
    }

    fn close(&mut self, name: &[u8]) {
        if Self::is_skipped_container(name) {
            self.skip_depth = self.skip_depth.saturating_sub(1);
            return;
        }
        if self.skip_depth > 0 {
            return;
        }

        match name {
            b"t" => self.in_text = false,
            b"p" if self.in_paragraph => {
                self.in_paragraph = false;
                let paragraph = std::mem::take(&mut self.paragraph);
                if self.in_cell {
                    self.cell_paragraphs.push(paragraph);
                } else {
                    let trimmed = paragraph.trim();
                    if !trimmed.is_empty() {
                        self.fragments.push(trimmed.to_string());
                    }
                }
            }
            b"txBody" if !self.in_table => self.in_text_body = false,
            b"tc" if self.in_cell => {
                self.in_cell = false;
                let text = self.cell_paragraphs.join("\n");
                self.row.push(text.trim().to_string());
            }
            b"tr" if self.in_table => {
                let row = std::mem::take(&mut self.row);
                self.fragments.push(row.join(CELL_SEPARATOR));
            }
            b"tbl" => self.in_table = false,
            _ => {}
        }
    }
}
