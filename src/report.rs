//! The `report` command: filter, guard the empty case, aggregate,
//! and render KPIs plus the three rollups as text tables or JSON.

use anyhow::{Context, Result};
use log::info;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::{
    aggregate::{self, DayTotal, OperatorRollup, ProductRollup, Totals},
    cli::ReportArgs,
    dataset::Dataset,
    table,
};

#[derive(Debug, Serialize)]
struct ReportDocument {
    totals: Totals,
    by_day: Vec<DayTotal>,
    top_products: Vec<ProductRollup>,
    by_operator: Vec<OperatorRollup>,
}

pub fn execute(args: &ReportArgs) -> Result<()> {
    let dataset = Dataset::load(&args.inputs)?;
    if dataset.is_empty() {
        println!("No data loaded; awaiting input.");
        return Ok(());
    }

    let rows = args.filters.criteria().apply(&dataset);
    if rows.is_empty() {
        println!("No rows match the selected filters.");
        return Ok(());
    }

    let totals = aggregate::totals(&rows)?;
    let by_day = aggregate::by_day(&rows);
    let top_products = aggregate::top_products(&rows, args.top);
    let by_operator = aggregate::by_operator(&rows);

    if args.json {
        let document = ReportDocument {
            totals,
            by_day,
            top_products,
            by_operator,
        };
        let rendered =
            serde_json::to_string_pretty(&document).context("Serializing report to JSON")?;
        println!("{rendered}");
    } else {
        render_text(&totals, &by_day, &top_products, &by_operator);
    }
    info!(
        "Reported on {} of {} row(s)",
        rows.len(),
        dataset.len()
    );
    Ok(())
}

fn render_text(
    totals: &Totals,
    by_day: &[DayTotal],
    top_products: &[ProductRollup],
    by_operator: &[OperatorRollup],
) {
    println!("Summary");
    table::print_table(
        &["metric", "value"],
        &[
            row2("total amount (TTC)", format_amount(totals.total_amount)),
            row2("total quantity", totals.total_quantity.to_string()),
            row2("sale lines", totals.row_count.to_string()),
            row2("active days", totals.active_day_count.to_string()),
            row2("avg amount / day", format_amount(totals.avg_amount_per_day)),
            row2("avg amount / line", format_amount(totals.avg_amount_per_row)),
        ],
    );

    if !by_day.is_empty() {
        println!("\nAmount by day");
        let rows: Vec<Vec<String>> = by_day
            .iter()
            .map(|entry| {
                vec![
                    entry.day.format("%Y-%m-%d").to_string(),
                    format_amount(entry.total_amount),
                ]
            })
            .collect();
        table::print_table(&["day", "amount"], &rows);
    }

    if !top_products.is_empty() {
        println!("\nTop products");
        let rows: Vec<Vec<String>> = top_products
            .iter()
            .map(|entry| {
                vec![
                    entry.product.clone(),
                    format_amount(entry.total_amount),
                    entry.total_quantity.to_string(),
                    entry.row_count.to_string(),
                ]
            })
            .collect();
        table::print_table(&["product", "amount", "quantity", "lines"], &rows);
    }

    if !by_operator.is_empty() {
        println!("\nAmount by operator");
        let rows: Vec<Vec<String>> = by_operator
            .iter()
            .map(|entry| vec![entry.operator.clone(), format_amount(entry.total_amount)])
            .collect();
        table::print_table(&["operator", "amount"], &rows);
    }
}

fn row2(metric: &str, value: String) -> Vec<String> {
    vec![metric.to_string(), value]
}

fn format_amount(amount: Decimal) -> String {
    amount.round_dp(2).normalize().to_string()
}
