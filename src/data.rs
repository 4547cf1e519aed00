//! Cell values and best-effort parsing primitives.
//!
//! Spreadsheet exports from pharmacy POS software are messy: dates show
//! up as typed cells, Excel serial numbers, or half a dozen textual
//! formats; amounts carry currency glyphs and French comma decimals.
//! Every converter here is total — an unparseable value becomes `None`
//! and the caller substitutes a sentinel, never an error.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;

/// A single raw spreadsheet cell, before canonicalization.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Date(NaiveDate),
    Empty,
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y", "%Y/%m/%d", "%d-%m-%Y"];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

pub fn parse_flexible_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    for fmt in DATE_FORMATS {
        if let Ok(parsed) = NaiveDate::parse_from_str(trimmed, fmt) {
            return Some(parsed);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(parsed.date());
        }
    }
    None
}

pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    // Serial 1 is 1900-01-01; the epoch is 1899-12-30 to absorb the
    // 1900 leap-year bug. Reject values outside a plausible range.
    if !serial.is_finite() || serial < 1.0 || serial > 4_000_000.0 {
        return None;
    }
    let base = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    base.checked_add_signed(Duration::days(serial.trunc() as i64))
}

pub fn cell_to_date(cell: &Cell) -> Option<NaiveDate> {
    match cell {
        Cell::Date(d) => Some(*d),
        Cell::Number(n) => excel_serial_to_date(*n),
        Cell::Text(s) => parse_flexible_date(s),
        Cell::Empty => None,
    }
}

pub fn cell_to_decimal(cell: &Cell) -> Option<Decimal> {
    match cell {
        Cell::Number(n) => Decimal::from_f64(*n).map(|d| d.normalize()),
        Cell::Text(s) => parse_decimal_text(s),
        Cell::Date(_) | Cell::Empty => None,
    }
}

/// Parses a monetary or quantity string, tolerating French formatting:
/// currency glyphs, space thousands separators, comma decimal separator.
pub fn parse_decimal_text(raw: &str) -> Option<Decimal> {
    let mut cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, '€' | '$' | ' ' | '\u{a0}' | '\u{202f}'))
        .collect();
    if cleaned.contains(',') && !cleaned.contains('.') {
        cleaned = cleaned.replace(',', ".");
    } else {
        cleaned = cleaned.replace(',', "");
    }
    cleaned.parse::<Decimal>().ok().map(|d| d.normalize())
}

pub fn cell_to_text(cell: &Cell) -> Option<String> {
    let rendered = match cell {
        Cell::Text(s) => s.trim().to_string(),
        Cell::Number(n) => {
            if n.fract() == 0.0 {
                format!("{n:.0}")
            } else {
                n.to_string()
            }
        }
        Cell::Date(d) => d.format("%Y-%m-%d").to_string(),
        Cell::Empty => return None,
    };
    if rendered.is_empty() { None } else { Some(rendered) }
}

/// Lowercases, trims, and strips French diacritics so header matching
/// treats `Opérateur`, `OPERATEUR`, and `opérateur ` identically.
pub fn fold_header(header: &str) -> String {
    header
        .trim()
        .chars()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            'à' | 'â' | 'ä' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'î' | 'ï' => 'i',
            'ô' | 'ö' => 'o',
            'ù' | 'û' | 'ü' => 'u',
            'ç' => 'c',
            other => other,
        })
        .collect()
}
