use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};

use crate::filter::{FilterCriteria, Selection};

#[derive(Debug, Parser)]
#[command(author, version, about = "Report on pharmacy point-of-sale exports", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show how a file's raw headers map onto the canonical sale schema
    Columns(ColumnsArgs),
    /// Preview normalized sale records from one or more files
    Preview(PreviewArgs),
    /// Compute KPI totals and rollups over the filtered dataset
    Report(ReportArgs),
    /// Export the filtered canonical records to a CSV file
    Export(ExportArgs),
}

#[derive(Debug, Args)]
pub struct ColumnsArgs {
    /// Input sales file (xlsx, xls, csv, or tsv)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
}

#[derive(Debug, Args)]
pub struct PreviewArgs {
    /// Input sales files, merged in the order given
    #[arg(short = 'i', long = "input", required = true, num_args = 1..)]
    pub inputs: Vec<PathBuf>,
    /// Number of rows to display
    #[arg(long, default_value_t = 10)]
    pub rows: usize,
}

#[derive(Debug, Args)]
pub struct ReportArgs {
    /// Input sales files, merged in the order given
    #[arg(short = 'i', long = "input", required = true, num_args = 1..)]
    pub inputs: Vec<PathBuf>,
    #[command(flatten)]
    pub filters: FilterArgs,
    /// Number of products in the top-products rollup
    #[arg(long, default_value_t = 10)]
    pub top: usize,
    /// Emit the report as one JSON document instead of text tables
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Input sales files, merged in the order given
    #[arg(short = 'i', long = "input", required = true, num_args = 1..)]
    pub inputs: Vec<PathBuf>,
    /// Destination CSV file
    #[arg(short = 'o', long = "output")]
    pub output: PathBuf,
    #[command(flatten)]
    pub filters: FilterArgs,
}

/// Filter flags shared by `report` and `export`. A flag left unset
/// leaves the corresponding predicate untouched (everything passes).
#[derive(Debug, Args, Default)]
pub struct FilterArgs {
    /// Keep only these operators (repeatable)
    #[arg(long = "operator", action = clap::ArgAction::Append)]
    pub operators: Vec<String>,
    /// Keep only these years (repeatable)
    #[arg(long = "year", action = clap::ArgAction::Append)]
    pub years: Vec<i32>,
    /// Keep only these months, formatted YYYY-MM (repeatable)
    #[arg(long = "month", action = clap::ArgAction::Append)]
    pub months: Vec<String>,
    /// Inclusive start of the date range (YYYY-MM-DD)
    #[arg(long = "from")]
    pub from: Option<NaiveDate>,
    /// Inclusive end of the date range (YYYY-MM-DD)
    #[arg(long = "to")]
    pub to: Option<NaiveDate>,
    /// Keep rows whose product name contains this text (case-insensitive)
    #[arg(long = "product")]
    pub product: Option<String>,
}

impl FilterArgs {
    pub fn criteria(&self) -> FilterCriteria {
        FilterCriteria {
            operators: selection_from(&self.operators),
            years: selection_from(&self.years),
            months: selection_from(&self.months),
            date_range: match (self.from, self.to) {
                (None, None) => None,
                (from, to) => Some((
                    from.unwrap_or(NaiveDate::MIN),
                    to.unwrap_or(NaiveDate::MAX),
                )),
            },
            product_contains: self.product.clone(),
        }
    }
}

fn selection_from<T: Ord + Clone>(values: &[T]) -> Selection<T> {
    if values.is_empty() {
        Selection::All
    } else {
        Selection::only(values.iter().cloned())
    }
}
