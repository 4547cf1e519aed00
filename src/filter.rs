//! Filter criteria over the unified dataset.
//!
//! A [`FilterCriteria`] is a conjunction of independent predicates; a
//! row must satisfy every enabled one. Each selection starts out as
//! [`Selection::All`] — the untouched default that passes every row,
//! including rows missing the field — mirroring the dashboard controls
//! that open with the full discovered set selected. An explicit empty
//! selection selects nothing.

use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::dataset::{Dataset, SaleRecord};

/// Membership predicate for a multi-select control.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Selection<T: Ord> {
    /// Untouched control: every row passes, missing values included.
    #[default]
    All,
    /// Explicit selection: rows missing the field never match.
    Only(BTreeSet<T>),
}

impl<T: Ord> Selection<T> {
    pub fn only(values: impl IntoIterator<Item = T>) -> Self {
        Selection::Only(values.into_iter().collect())
    }

    pub fn admits(&self, value: Option<&T>) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(set) => value.is_some_and(|v| set.contains(v)),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FilterCriteria {
    pub operators: Selection<String>,
    pub years: Selection<i32>,
    pub months: Selection<String>,
    /// Inclusive on both endpoints; compares calendar dates only.
    pub date_range: Option<(NaiveDate, NaiveDate)>,
    /// Case-insensitive substring match against the product name.
    pub product_contains: Option<String>,
}

impl FilterCriteria {
    pub fn matches(&self, record: &SaleRecord) -> bool {
        self.operators.admits(record.operator.as_ref())
            && self.years.admits(record.year().as_ref())
            && self.months.admits(record.month_key().as_ref())
            && self.matches_date_range(record)
            && self.matches_product(record)
    }

    /// Returns the subsequence of rows satisfying all enabled
    /// predicates, preserving dataset order.
    pub fn apply<'a>(&self, dataset: &'a Dataset) -> Vec<&'a SaleRecord> {
        dataset
            .records
            .iter()
            .filter(|record| self.matches(record))
            .collect()
    }

    fn matches_date_range(&self, record: &SaleRecord) -> bool {
        match self.date_range {
            None => true,
            // Undated rows never fall inside an active range.
            Some((start, end)) => record
                .date
                .is_some_and(|d| d >= start && d <= end),
        }
    }

    fn matches_product(&self, record: &SaleRecord) -> bool {
        match self.product_contains.as_deref() {
            None | Some("") => true,
            Some(needle) => record
                .product
                .as_deref()
                .is_some_and(|p| p.to_lowercase().contains(&needle.to_lowercase())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn record(operator: Option<&str>, product: Option<&str>, date: Option<&str>) -> SaleRecord {
        SaleRecord {
            product: product.map(str::to_string),
            unit_price: None,
            amount: Decimal::ONE,
            quantity: Decimal::ONE,
            client: None,
            operator: operator.map(str::to_string),
            code: None,
            date: date.map(|d| d.parse().unwrap()),
            source_file: "ventes.xlsx".to_string(),
        }
    }

    #[test]
    fn untouched_criteria_pass_every_row() {
        let criteria = FilterCriteria::default();
        assert!(criteria.matches(&record(None, None, None)));
        assert!(criteria.matches(&record(Some("ALICE"), Some("ASPIRINE"), Some("2025-01-05"))));
    }

    #[test]
    fn empty_selection_selects_none() {
        let criteria = FilterCriteria {
            operators: Selection::only(Vec::<String>::new()),
            ..FilterCriteria::default()
        };
        assert!(!criteria.matches(&record(Some("ALICE"), None, None)));
        assert!(!criteria.matches(&record(None, None, None)));
    }

    #[test]
    fn operator_selection_excludes_missing_operators() {
        let criteria = FilterCriteria {
            operators: Selection::only(["ALICE".to_string()]),
            ..FilterCriteria::default()
        };
        assert!(criteria.matches(&record(Some("ALICE"), None, None)));
        assert!(!criteria.matches(&record(Some("BOB"), None, None)));
        assert!(!criteria.matches(&record(None, None, None)));
    }

    #[test]
    fn date_range_is_inclusive_and_skips_undated_rows() {
        let criteria = FilterCriteria {
            date_range: Some((
                "2025-01-05".parse().unwrap(),
                "2025-01-10".parse().unwrap(),
            )),
            ..FilterCriteria::default()
        };
        assert!(criteria.matches(&record(None, None, Some("2025-01-05"))));
        assert!(criteria.matches(&record(None, None, Some("2025-01-10"))));
        assert!(!criteria.matches(&record(None, None, Some("2025-01-11"))));
        assert!(!criteria.matches(&record(None, None, None)));
    }

    #[test]
    fn product_filter_is_case_insensitive_and_rejects_missing_products() {
        let criteria = FilterCriteria {
            product_contains: Some("aspirine".to_string()),
            ..FilterCriteria::default()
        };
        assert!(criteria.matches(&record(None, Some("ASPIRINE 500"), None)));
        assert!(!criteria.matches(&record(None, Some("DOLIPRANE"), None)));
        assert!(!criteria.matches(&record(None, None, None)));

        let blank = FilterCriteria {
            product_contains: Some(String::new()),
            ..FilterCriteria::default()
        };
        assert!(blank.matches(&record(None, None, None)));
    }

    #[test]
    fn month_and_year_selections_compose() {
        let criteria = FilterCriteria {
            years: Selection::only([2025]),
            months: Selection::only(["2025-02".to_string()]),
            ..FilterCriteria::default()
        };
        assert!(criteria.matches(&record(None, None, Some("2025-02-14"))));
        assert!(!criteria.matches(&record(None, None, Some("2025-01-14"))));
        assert!(!criteria.matches(&record(None, None, Some("2024-02-14"))));
    }
}
