//! Spreadsheet reading using calamine
//!
//! Every sheet of a workbook is read into a [`SheetTable`]: the used range of
//! the sheet with each cell rendered to the text that will appear in the PDF.
//! A sheet that fails to load is skipped and recorded rather than failing the
//! whole workbook.

use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Data, ExcelDateTime, Range, Reader};
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Which sheets of a workbook become report sections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SheetSelection {
    /// Only the first sheet, one section per file
    First,
    /// Every sheet, one section per sheet
    #[default]
    All,
}

/// Options for reading workbooks
#[derive(Debug, Clone)]
pub struct ReadOptions {
    /// Treat the first used row as the column header
    pub header_row: bool,
    /// Which sheets to read
    pub sheets: SheetSelection,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            header_row: true,
            sheets: SheetSelection::All,
        }
    }
}

/// One sheet rendered to display text
#[derive(Debug, Clone, PartialEq)]
pub struct SheetTable {
    /// Sheet name as stored in the workbook
    pub name: String,
    /// Column header, when the first row is used as one
    pub header: Option<Vec<String>>,
    /// Data rows, each padded to [`SheetTable::column_count`] cells
    pub rows: Vec<Vec<String>>,
}

impl SheetTable {
    pub fn column_count(&self) -> usize {
        let header = self.header.as_ref().map_or(0, Vec::len);
        self.rows.iter().map(Vec::len).fold(header, usize::max)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// A sheet that was left out of the report
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedSheet {
    pub name: String,
    pub reason: String,
}

/// A workbook with its readable sheets
#[derive(Debug, Clone)]
pub struct Workbook {
    pub path: PathBuf,
    /// File name without directories, used for titles and bookmarks
    pub name: String,
    pub sheets: Vec<SheetTable>,
    pub skipped: Vec<SkippedSheet>,
}

/// Read a workbook from disk
///
/// Sheets that cannot be read, or are empty, end up in [`Workbook::skipped`].
/// Only a failure to open the file itself is an error.
pub fn read_workbook(path: &Path, options: &ReadOptions) -> Result<Workbook> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }

    let mut workbook = open_workbook_auto(path)?;

    let mut sheet_names = workbook.sheet_names();
    if options.sheets == SheetSelection::First {
        sheet_names.truncate(1);
    }

    let mut sheets = Vec::new();
    let mut skipped = Vec::new();

    for name in sheet_names {
        match workbook.worksheet_range(&name) {
            Ok(range) => match table_from_range(&name, &range, options.header_row) {
                Some(table) => {
                    debug!(
                        sheet = %name,
                        rows = table.row_count(),
                        columns = table.column_count(),
                        "read sheet"
                    );
                    sheets.push(table);
                }
                None => {
                    warn!(file = %path.display(), sheet = %name, "skipping empty sheet");
                    skipped.push(SkippedSheet {
                        name,
                        reason: "sheet is empty".to_string(),
                    });
                }
            },
            Err(e) => {
                warn!(file = %path.display(), sheet = %name, error = %e, "skipping unreadable sheet");
                skipped.push(SkippedSheet {
                    name,
                    reason: e.to_string(),
                });
            }
        }
    }

    Ok(Workbook {
        path: path.to_path_buf(),
        name: file_display_name(path),
        sheets,
        skipped,
    })
}

/// Convert a calamine range into a table of display strings
///
/// Returns `None` when the range holds no values at all.
pub fn table_from_range(name: &str, range: &Range<Data>, header_row: bool) -> Option<SheetTable> {
    let mut rows: Vec<Vec<String>> = range
        .rows()
        .map(|row| row.iter().map(format_cell).collect::<Vec<_>>())
        .filter(|row| row.iter().any(|cell| !cell.is_empty()))
        .collect();

    if rows.is_empty() {
        return None;
    }

    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    for row in &mut rows {
        row.resize(width, String::new());
    }

    let header = if header_row { Some(rows.remove(0)) } else { None };

    Some(SheetTable {
        name: name.to_string(),
        header,
        rows,
    })
}

/// Render one cell the way it should read in the report
pub fn format_cell(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim_end().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => format_float(*f),
        Data::Bool(true) => "TRUE".to_string(),
        Data::Bool(false) => "FALSE".to_string(),
        Data::DateTime(dt) => {
            if dt.is_duration() {
                format_duration(dt.as_f64())
            } else {
                format_excel_datetime(dt)
            }
        }
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Error(e) => {
            debug!(error = %e, "cell holds an error value");
            String::new()
        }
    }
}

fn format_float(value: f64) -> String {
    if !value.is_finite() {
        return String::new();
    }
    if value.fract() == 0.0 && value.abs() < 1e15 {
        return format!("{}", value as i64);
    }
    let text = format!("{:.6}", value);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" {
        "0".to_string()
    } else {
        text.to_string()
    }
}

/// Dates print as ISO dates, times of day as `HH:MM:SS`, and anything else
/// as an ISO date-time. Serials outside chrono's range print as numbers.
fn format_excel_datetime(dt: &ExcelDateTime) -> String {
    let serial = dt.as_f64();
    let Some(datetime) = dt.as_datetime() else {
        return format_float(serial);
    };

    if serial.fract() == 0.0 {
        datetime.format("%Y-%m-%d").to_string()
    } else if serial < 1.0 {
        datetime.format("%H:%M:%S").to_string()
    } else {
        datetime.format("%Y-%m-%dT%H:%M:%S").to_string()
    }
}

fn format_duration(days: f64) -> String {
    let total_seconds = (days * 86_400.0).round() as i64;
    let sign = if total_seconds < 0 { "-" } else { "" };
    let total_seconds = total_seconds.abs();
    format!(
        "{}{}:{:02}:{:02}",
        sign,
        total_seconds / 3600,
        (total_seconds % 3600) / 60,
        total_seconds % 60
    )
}

/// File name without the directory part
pub fn file_display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
