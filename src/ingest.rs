//! Spreadsheet readers.
//!
//! Produces a [`RawTable`] — raw header strings plus untyped cells —
//! from an xlsx/xls workbook (first worksheet) or a csv/tsv file.
//! Everything downstream is best-effort, but a file that cannot be
//! read as a spreadsheet at all is the one hard failure in the system.

use std::path::{Path, PathBuf};

use calamine::{Data, Reader, open_workbook_auto};
use thiserror::Error;

use crate::data::{Cell, excel_serial_to_date};

/// One input file, parsed but not yet normalized.
#[derive(Debug, Clone)]
pub struct RawTable {
    /// Display name of the originating file, used as the provenance tag.
    pub source: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("cannot open '{path}': {reason}")]
    Open { path: PathBuf, reason: String },
    #[error("'{path}' is not a readable spreadsheet: {reason}")]
    Unreadable { path: PathBuf, reason: String },
    #[error("workbook '{path}' contains no worksheets")]
    EmptyWorkbook { path: PathBuf },
}

pub fn read_table(path: &Path) -> Result<RawTable, IngestError> {
    let source = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("xlsx") || ext.eq_ignore_ascii_case("xls") => {
            read_workbook(path, source)
        }
        _ => read_delimited(path, source),
    }
}

fn read_workbook(path: &Path, source: String) -> Result<RawTable, IngestError> {
    let mut workbook = open_workbook_auto(path).map_err(|e| IngestError::Open {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| IngestError::EmptyWorkbook {
            path: path.to_path_buf(),
        })?;
    let range = workbook
        .worksheet_range(&sheet)
        .map_err(|e| IngestError::Unreadable {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    let mut rows_iter = range.rows();
    let headers = match rows_iter.next() {
        Some(first) => first
            .iter()
            .map(|cell| match workbook_cell(cell) {
                Cell::Text(s) => s,
                Cell::Number(n) => n.to_string(),
                Cell::Date(d) => d.to_string(),
                Cell::Empty => String::new(),
            })
            .collect(),
        None => Vec::new(),
    };
    let rows = rows_iter
        .map(|row| row.iter().map(workbook_cell).collect())
        .collect();
    Ok(RawTable {
        source,
        headers,
        rows,
    })
}

fn workbook_cell(data: &Data) -> Cell {
    match data {
        Data::String(s) => Cell::Text(s.clone()),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Text(b.to_string()),
        Data::DateTime(dt) => match excel_serial_to_date(dt.as_f64()) {
            Some(date) => Cell::Date(date),
            None => Cell::Empty,
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Error(_) | Data::Empty => Cell::Empty,
    }
}

fn read_delimited(path: &Path, source: String) -> Result<RawTable, IngestError> {
    let delimiter = resolve_delimiter(path);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .delimiter(delimiter)
        .flexible(true)
        .from_path(path)
        .map_err(|e| IngestError::Open {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    let mut headers = Vec::new();
    let mut rows = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record.map_err(|e| IngestError::Unreadable {
            path: path.to_path_buf(),
            reason: format!("row {}: {e}", idx + 1),
        })?;
        if idx == 0 {
            headers = record.iter().map(|field| field.to_string()).collect();
        } else {
            let row = record
                .iter()
                .map(|field| {
                    if field.trim().is_empty() {
                        Cell::Empty
                    } else {
                        Cell::Text(field.to_string())
                    }
                })
                .collect();
            rows.push(row);
        }
    }
    Ok(RawTable {
        source,
        headers,
        rows,
    })
}

fn resolve_delimiter(path: &Path) -> u8 {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => b'\t',
        _ => b',',
    }
}
