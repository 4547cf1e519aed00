//! Canonical sale records: coercion, derivation, and multi-file merge.
//!
//! A [`SaleRecord`] is built once per raw row and never mutated.
//! Coercion is best-effort with per-file defaults: whether a column
//! exists at all is decided once per file by the [`ColumnMap`], and the
//! fallback for a missing column differs from the fallback for an
//! unparseable cell (quantity 1 vs 0). `amount` is always populated —
//! taken from the amount column, computed as `unit_price * quantity`,
//! or zeroed when neither column exists.

use std::collections::BTreeSet;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use log::info;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::data::{Cell, cell_to_date, cell_to_decimal, cell_to_text};
use crate::ingest::{self, RawTable};
use crate::normalize::{CanonicalField, ColumnMap};

/// One normalized sale line. `source_file` is the provenance tag.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SaleRecord {
    pub product: Option<String>,
    pub unit_price: Option<Decimal>,
    pub amount: Decimal,
    pub quantity: Decimal,
    pub client: Option<String>,
    pub operator: Option<String>,
    pub code: Option<String>,
    pub date: Option<NaiveDate>,
    pub source_file: String,
}

impl SaleRecord {
    /// Calendar day, defined only when the row carries a parseable date.
    pub fn day(&self) -> Option<NaiveDate> {
        self.date
    }

    /// Month bucket as `YYYY-MM`.
    pub fn month_key(&self) -> Option<String> {
        self.date.map(|d| d.format("%Y-%m").to_string())
    }

    pub fn year(&self) -> Option<i32> {
        self.date.map(|d| d.year())
    }

    /// English day name, matching what the legacy dashboard displayed.
    pub fn weekday(&self) -> Option<String> {
        self.date.map(|d| d.format("%A").to_string())
    }
}

/// Applies the column map and coercion rules to every row of one file.
/// Normalizing the same table twice yields identical records.
pub fn normalize_table(table: &RawTable) -> Vec<SaleRecord> {
    let map = ColumnMap::build(&table.headers);
    table
        .rows
        .iter()
        .map(|row| build_record(row, &map, &table.source))
        .collect()
}

fn field_cell<'a>(row: &'a [Cell], map: &ColumnMap, field: CanonicalField) -> Option<&'a Cell> {
    map.index_of(field).and_then(|idx| row.get(idx))
}

fn build_record(row: &[Cell], map: &ColumnMap, source: &str) -> SaleRecord {
    // Column absent from the file: every row gets quantity 1 so line
    // counts and quantity sums coincide. Column present but the cell
    // unparseable: 0. The asymmetry is observed legacy behavior.
    let quantity = if map.has(CanonicalField::Quantity) {
        field_cell(row, map, CanonicalField::Quantity)
            .and_then(cell_to_decimal)
            .unwrap_or(Decimal::ZERO)
    } else {
        Decimal::ONE
    };

    let unit_price = map.has(CanonicalField::UnitPrice).then(|| {
        field_cell(row, map, CanonicalField::UnitPrice)
            .and_then(cell_to_decimal)
            .unwrap_or(Decimal::ZERO)
    });

    let amount = if map.has(CanonicalField::Amount) {
        field_cell(row, map, CanonicalField::Amount)
            .and_then(cell_to_decimal)
            .unwrap_or(Decimal::ZERO)
    } else if let Some(price) = unit_price {
        price * quantity
    } else {
        Decimal::ZERO
    };

    SaleRecord {
        product: field_cell(row, map, CanonicalField::Product).and_then(cell_to_text),
        unit_price,
        amount,
        quantity,
        client: field_cell(row, map, CanonicalField::Client).and_then(cell_to_text),
        operator: field_cell(row, map, CanonicalField::Operator).and_then(cell_to_text),
        code: field_cell(row, map, CanonicalField::Code).and_then(cell_to_text),
        date: field_cell(row, map, CanonicalField::Date).and_then(cell_to_date),
        source_file: source.to_string(),
    }
}

/// The unified dataset: all files concatenated in file-major,
/// row-minor order. No deduplication, no primary key.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub records: Vec<SaleRecord>,
}

impl Dataset {
    /// Reads and normalizes each file independently, then concatenates.
    /// A column-mapping decision in one file never affects another.
    /// Zero paths produce an empty dataset.
    pub fn load(paths: &[PathBuf]) -> Result<Dataset> {
        let mut records = Vec::new();
        for path in paths {
            let table = ingest::read_table(path)
                .with_context(|| format!("Loading sales file {:?}", path))?;
            let rows = normalize_table(&table);
            info!("Normalized {} row(s) from '{}'", rows.len(), table.source);
            records.extend(rows);
        }
        Ok(Dataset { records })
    }

    pub fn from_tables<'a>(tables: impl IntoIterator<Item = &'a RawTable>) -> Dataset {
        let mut records = Vec::new();
        for table in tables {
            records.extend(normalize_table(table));
        }
        Dataset { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct operator names, for populating the default filter set.
    pub fn operators(&self) -> BTreeSet<String> {
        self.records
            .iter()
            .filter_map(|r| r.operator.clone())
            .collect()
    }

    pub fn years(&self) -> BTreeSet<i32> {
        self.records.iter().filter_map(|r| r.year()).collect()
    }

    pub fn months(&self) -> BTreeSet<String> {
        self.records.iter().filter_map(|r| r.month_key()).collect()
    }

    /// Earliest and latest dated rows, if any row has a date.
    pub fn date_span(&self) -> Option<(NaiveDate, NaiveDate)> {
        let mut dates = self.records.iter().filter_map(|r| r.date);
        let first = dates.next()?;
        Some(dates.fold((first, first), |(min, max), d| (min.min(d), max.max(d))))
    }
}
