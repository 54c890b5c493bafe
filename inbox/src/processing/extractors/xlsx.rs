use calamine::{
    open_workbook_auto, open_workbook_auto_from_rs, Data, ExcelDateTime, Range, Reader,
};
use chrono::Timelike;
use std::io::{Cursor, Read, Seek};
use std::path::Path;

use crate::config::DEFAULT_MAX_SHEET_ROWS;
use crate::error::{InboxError, Result};
use crate::models::{SheetContent, Spreadsheet};

pub struct XlsxExtractor {
    max_rows: usize,
}

impl Default for XlsxExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SHEET_ROWS)
    }
}

impl XlsxExtractor {
    pub fn new(max_rows: usize) -> Self {
        Self { max_rows }
    }

    /// Workbooks are opened by path so `.xlsm` is recognised from its extension.
    /// The handle is dropped before returning, on success and on error.
    pub fn extract_file(&self, path: &Path) -> Result<Spreadsheet> {
        let workbook = open_workbook_auto(path)
            .map_err(|e| InboxError::Processing(format!("XLSX parse error: {e}")))?;
        self.extract_workbook(workbook)
    }

    pub fn extract(&self, bytes: &[u8]) -> Result<Spreadsheet> {
        let workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
            .map_err(|e| InboxError::Processing(format!("XLSX parse error: {e}")))?;
        self.extract_workbook(workbook)
    }

    fn extract_workbook<RS: Read + Seek>(
        &self,
        mut workbook: calamine::Sheets<RS>,
    ) -> Result<Spreadsheet> {
        let sheet_names = workbook.sheet_names();
        let mut sheets = Vec::new();

        for name in &sheet_names {
            let range = workbook.worksheet_range(name).map_err(|e| {
                InboxError::Processing(format!("Failed to read sheet '{name}': {e}"))
            })?;

            if let Some(sheet) = self.extract_sheet(name, &range) {
                sheets.push(sheet);
            }
        }

        Ok(Spreadsheet {
            sheet_count: sheet_names.len(),
            sheets,
        })
    }

    /// Scan at most `max_rows` rows counted from row 1 of the sheet.
    ///
    /// Returns `None` when no examined row has a non-empty cell.
    pub fn extract_sheet(&self, name: &str, range: &Range<Data>) -> Option<SheetContent> {
        // calamine ranges begin at the first used cell; the blank rows and
        // columns before it still count as examined / as empty cells.
        let (start_row, start_col) = range
            .start()
            .map(|(row, col)| (row as usize, col as usize))
            .unwrap_or((0, 0));
        let (height, _) = range.get_size();
        let total_rows = if range.is_empty() { 0 } else { start_row + height };

        let mut rows = Vec::new();
        for row in range.rows().take(self.max_rows.saturating_sub(start_row)) {
            let cells: Vec<String> = std::iter::repeat(String::new())
                .take(start_col)
                .chain(row.iter().map(|cell| Self::format_cell_value(Some(cell))))
                .collect();

            if cells.iter().any(|c| !c.is_empty()) {
                rows.push(cells);
            }
        }

        if rows.is_empty() {
            return None;
        }

        Some(SheetContent {
            sheet_name: name.to_string(),
            row_count: rows.len(),
            truncated: total_rows > self.max_rows,
            rows,
        })
    }

    fn format_cell_value(cell: Option<&Data>) -> String {
        match cell {
            Some(Data::String(s)) => s.clone(),
            Some(Data::Int(i)) => i.to_string(),
            Some(Data::Float(f)) => {
                // Integral floats print without a fractional part
                let s = format!("{f}");
                if s.contains('.') {
                    s.trim_end_matches('0').trim_end_matches('.').to_string()
                } else {
                    s
                }
            }
            Some(Data::Bool(b)) => b.to_string(),
            Some(Data::DateTime(dt)) => Self::format_datetime(dt),
            Some(Data::Empty) | None => String::new(),
            Some(other) => other.to_string(),
        }
    }

    /// Dates render as `YYYY-MM-DD HH:MM:SS`, times of day as `HH:MM:SS`.
    fn format_datetime(dt: &ExcelDateTime) -> String {
        if dt.is_duration() {
            return dt
                .as_duration()
                .map(Self::format_duration)
                .unwrap_or_else(|| dt.to_string());
        }

        let Some(datetime) = dt.as_datetime() else {
            return dt.to_string();
        };
        let time_format = if datetime.nanosecond() == 0 {
            "%H:%M:%S"
        } else {
            "%H:%M:%S%.6f"
        };

        if (0.0..1.0).contains(&dt.as_f64()) {
            datetime.format(time_format).to_string()
        } else {
            format!(
                "{} {}",
                datetime.format("%Y-%m-%d"),
                datetime.format(time_format)
            )
        }
    }

    /// `H:MM:SS`, prefixed with the day count once it reaches a full day.
    fn format_duration(duration: chrono::Duration) -> String {
        let total = duration.num_seconds();
        let days = total.div_euclid(86_400);
        let rest = total.rem_euclid(86_400);
        let clock = format!("{}:{:02}:{:02}", rest / 3600, rest % 3600 / 60, rest % 60);

        match days {
            0 => clock,
            1 | -1 => format!("{days} day, {clock}"),
            _ => format!("{days} days, {clock}"),
        }
    }
}
