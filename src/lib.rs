pub mod aggregate;
pub mod cli;
pub mod data;
pub mod dataset;
pub mod export;
pub mod filter;
pub mod ingest;
pub mod normalize;
pub mod report;
pub mod session;
pub mod table;

use std::{env, sync::OnceLock};

use anyhow::{Context, Result};
use clap::Parser;
use log::{LevelFilter, info};

use crate::cli::{Cli, Commands};
use crate::dataset::Dataset;
use crate::normalize::{CanonicalField, HeaderDecision, classify_header};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("pharma_report", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Columns(args) => handle_columns(&args),
        Commands::Preview(args) => handle_preview(&args),
        Commands::Report(args) => report::execute(&args),
        Commands::Export(args) => handle_export(&args),
    }
}

fn handle_columns(args: &cli::ColumnsArgs) -> Result<()> {
    let raw = ingest::read_table(&args.input)
        .with_context(|| format!("Loading sales file {:?}", args.input))?;
    let mut mapped = 0usize;
    let rows: Vec<Vec<String>> = raw
        .headers
        .iter()
        .map(|header| {
            let decision = match classify_header(header) {
                HeaderDecision::Mapped(field) => {
                    mapped += 1;
                    field.name().to_string()
                }
                HeaderDecision::Placeholder => "(placeholder, discarded)".to_string(),
                HeaderDecision::Dropped => "(dropped)".to_string(),
            };
            vec![header.clone(), decision]
        })
        .collect();
    table::print_table(&["raw header", "canonical field"], &rows);
    info!(
        "Mapped {mapped} of {} header(s) in '{}'",
        raw.headers.len(),
        raw.source
    );
    Ok(())
}

fn handle_preview(args: &cli::PreviewArgs) -> Result<()> {
    let dataset = Dataset::load(&args.inputs)?;
    if dataset.is_empty() {
        println!("No data loaded; awaiting input.");
        return Ok(());
    }
    let headers: Vec<&str> = CanonicalField::ALL
        .iter()
        .map(|field| field.name())
        .chain(["source_file"])
        .collect();
    let rows: Vec<Vec<String>> = dataset
        .records
        .iter()
        .take(args.rows)
        .map(|record| {
            vec![
                record.product.clone().unwrap_or_default(),
                record
                    .unit_price
                    .map(|p| p.to_string())
                    .unwrap_or_default(),
                record.amount.to_string(),
                record.quantity.to_string(),
                record.client.clone().unwrap_or_default(),
                record.operator.clone().unwrap_or_default(),
                record
                    .date
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_default(),
                record.code.clone().unwrap_or_default(),
                record.source_file.clone(),
            ]
        })
        .collect();
    table::print_table(&headers, &rows);
    info!("Displayed {} of {} row(s)", rows.len(), dataset.len());
    Ok(())
}

fn handle_export(args: &cli::ExportArgs) -> Result<()> {
    let dataset = Dataset::load(&args.inputs)?;
    let rows = args.filters.criteria().apply(&dataset);
    if rows.is_empty() {
        println!("No rows match the selected filters; writing an empty export.");
    }
    export::write_csv_path(&args.output, &rows)?;
    info!("Exported {} row(s) to {:?}", rows.len(), args.output);
    Ok(())
}
