//! CSV export of filtered canonical records.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

use crate::dataset::SaleRecord;

const HEADERS: [&str; 9] = [
    "product",
    "unit_price",
    "amount",
    "quantity",
    "client",
    "operator",
    "date",
    "code",
    "source_file",
];

pub fn write_csv<W: Write>(writer: W, rows: &[&SaleRecord]) -> Result<()> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(HEADERS)
        .context("Writing export header row")?;
    for record in rows {
        out.write_record([
            record.product.as_deref().unwrap_or("").to_string(),
            record
                .unit_price
                .map(|p| p.to_string())
                .unwrap_or_default(),
            record.amount.to_string(),
            record.quantity.to_string(),
            record.client.as_deref().unwrap_or("").to_string(),
            record.operator.as_deref().unwrap_or("").to_string(),
            record
                .date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            record.code.as_deref().unwrap_or("").to_string(),
            record.source_file.clone(),
        ])
        .context("Writing export data row")?;
    }
    out.flush().context("Flushing export output")?;
    Ok(())
}

pub fn write_csv_path(path: &Path, rows: &[&SaleRecord]) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Creating export file {:?}", path))?;
    write_csv(std::io::BufWriter::new(file), rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn export_emits_canonical_columns_with_provenance() {
        let record = SaleRecord {
            product: Some("ASPIRINE".to_string()),
            unit_price: None,
            amount: "100".parse().unwrap(),
            quantity: Decimal::TWO,
            client: None,
            operator: Some("ALICE".to_string()),
            code: Some("3400934056781".to_string()),
            date: Some("2025-01-05".parse().unwrap()),
            source_file: "ventes.xlsx".to_string(),
        };
        let mut buffer = Vec::new();
        write_csv(&mut buffer, &[&record]).unwrap();
        let rendered = String::from_utf8(buffer).unwrap();
        let mut lines = rendered.lines();
        assert_eq!(
            lines.next().unwrap(),
            "product,unit_price,amount,quantity,client,operator,date,code,source_file"
        );
        assert_eq!(
            lines.next().unwrap(),
            "ASPIRINE,,100,2,,ALICE,2025-01-05,3400934056781,ventes.xlsx"
        );
    }
}
