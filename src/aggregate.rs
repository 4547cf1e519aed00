//! KPI totals and grouped rollups over a filtered dataset.
//!
//! Pure, stateless reductions: every function takes the filtered row
//! slice and returns fresh summary values. Rows missing a grouping key
//! are excluded from that rollup only, never from the others.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use anyhow::{Result, bail};
use chrono::NaiveDate;
use itertools::Itertools;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::dataset::SaleRecord;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Totals {
    pub total_amount: Decimal,
    pub total_quantity: Decimal,
    pub row_count: usize,
    /// Number of distinct non-missing days.
    pub active_day_count: usize,
    /// Zero when no row carries a date.
    pub avg_amount_per_day: Decimal,
    pub avg_amount_per_row: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayTotal {
    pub day: NaiveDate,
    pub total_amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductRollup {
    pub product: String,
    pub total_amount: Decimal,
    pub total_quantity: Decimal,
    pub row_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperatorRollup {
    pub operator: String,
    pub total_amount: Decimal,
}

/// Summary KPIs. The mean over zero rows is undefined, so callers must
/// take the "no matching rows" path before aggregating; an empty slice
/// here is a programming error surfaced as `Err`.
pub fn totals(rows: &[&SaleRecord]) -> Result<Totals> {
    if rows.is_empty() {
        bail!("Cannot aggregate an empty row set; handle the no-matching-rows case first");
    }
    let total_amount: Decimal = rows.iter().map(|r| r.amount).sum();
    let total_quantity: Decimal = rows.iter().map(|r| r.quantity).sum();
    let active_days: BTreeSet<NaiveDate> = rows.iter().filter_map(|r| r.day()).collect();
    let active_day_count = active_days.len();
    let avg_amount_per_day = if active_day_count == 0 {
        Decimal::ZERO
    } else {
        total_amount / Decimal::from(active_day_count as u64)
    };
    Ok(Totals {
        total_amount,
        total_quantity,
        row_count: rows.len(),
        active_day_count,
        avg_amount_per_day,
        avg_amount_per_row: total_amount / Decimal::from(rows.len() as u64),
    })
}

/// Amount per distinct day, ascending. Undated rows are skipped.
pub fn by_day(rows: &[&SaleRecord]) -> Vec<DayTotal> {
    let mut buckets: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
    for record in rows {
        if let Some(day) = record.day() {
            *buckets.entry(day).or_default() += record.amount;
        }
    }
    buckets
        .into_iter()
        .map(|(day, total_amount)| DayTotal { day, total_amount })
        .collect()
}

/// Top `n` products by summed amount, descending, ties broken by name.
pub fn top_products(rows: &[&SaleRecord], n: usize) -> Vec<ProductRollup> {
    let mut buckets: HashMap<&str, (Decimal, Decimal, usize)> = HashMap::new();
    for record in rows {
        let Some(product) = record.product.as_deref() else {
            continue;
        };
        let entry = buckets.entry(product).or_default();
        entry.0 += record.amount;
        entry.1 += record.quantity;
        entry.2 += 1;
    }
    buckets
        .into_iter()
        .sorted_by(|(name_a, (amount_a, _, _)), (name_b, (amount_b, _, _))| {
            amount_b.cmp(amount_a).then_with(|| name_a.cmp(name_b))
        })
        .take(n)
        .map(|(product, (total_amount, total_quantity, row_count))| ProductRollup {
            product: product.to_string(),
            total_amount,
            total_quantity,
            row_count,
        })
        .collect()
}

/// Amount per operator, descending, ties broken by name.
pub fn by_operator(rows: &[&SaleRecord]) -> Vec<OperatorRollup> {
    let mut buckets: HashMap<&str, Decimal> = HashMap::new();
    for record in rows {
        let Some(operator) = record.operator.as_deref() else {
            continue;
        };
        *buckets.entry(operator).or_default() += record.amount;
    }
    buckets
        .into_iter()
        .sorted_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)))
        .map(|(operator, total_amount)| OperatorRollup {
            operator: operator.to_string(),
            total_amount,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn sale(product: &str, operator: &str, amount: &str, date: Option<&str>) -> SaleRecord {
        SaleRecord {
            product: Some(product.to_string()),
            unit_price: None,
            amount: dec(amount),
            quantity: Decimal::ONE,
            client: None,
            operator: Some(operator.to_string()),
            code: None,
            date: date.map(|d| d.parse().unwrap()),
            source_file: "ventes.xlsx".to_string(),
        }
    }

    #[test]
    fn totals_refuse_an_empty_row_set() {
        assert!(totals(&[]).is_err());
    }

    #[test]
    fn totals_with_no_dated_rows_report_zero_daily_average() {
        let a = sale("A", "ALICE", "10", None);
        let rows = vec![&a];
        let t = totals(&rows).unwrap();
        assert_eq!(t.active_day_count, 0);
        assert_eq!(t.avg_amount_per_day, Decimal::ZERO);
        assert_eq!(t.avg_amount_per_row, dec("10"));
    }

    #[test]
    fn by_day_is_ascending_and_skips_undated_rows() {
        let a = sale("A", "ALICE", "10", Some("2025-02-01"));
        let b = sale("B", "BOB", "20", Some("2025-01-15"));
        let c = sale("C", "ALICE", "30", None);
        let d = sale("D", "BOB", "5", Some("2025-01-15"));
        let rows = vec![&a, &b, &c, &d];
        let series = by_day(&rows);
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].day, "2025-01-15".parse().unwrap());
        assert_eq!(series[0].total_amount, dec("25"));
        assert_eq!(series[1].day, "2025-02-01".parse().unwrap());
    }

    #[test]
    fn top_products_sorts_descending_and_truncates() {
        let a = sale("ASPIRINE", "ALICE", "100", None);
        let b = sale("DOLIPRANE", "ALICE", "300", None);
        let c = sale("ASPIRINE", "BOB", "50", None);
        let d = sale("SPASFON", "BOB", "20", None);
        let rows = vec![&a, &b, &c, &d];
        let top = top_products(&rows, 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].product, "DOLIPRANE");
        assert_eq!(top[1].product, "ASPIRINE");
        assert_eq!(top[1].total_amount, dec("150"));
        assert_eq!(top[1].row_count, 2);
        assert_eq!(top[1].total_quantity, dec("2"));
    }

    #[test]
    fn by_operator_breaks_amount_ties_by_name() {
        let a = sale("A", "CLAIRE", "40", None);
        let b = sale("B", "BOB", "40", None);
        let c = sale("C", "ALICE", "90", None);
        let rows = vec![&a, &b, &c];
        let rollup = by_operator(&rows);
        let names: Vec<_> = rollup.iter().map(|r| r.operator.as_str()).collect();
        assert_eq!(names, vec!["ALICE", "BOB", "CLAIRE"]);
    }
}
