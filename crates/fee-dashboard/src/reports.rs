//! Report generation (CSV outputs and console summary)

use anyhow::Result;
use csv::Writer;
use std::path::Path;

use fee_metrics::{CategoryTotal, MetricRecord, PeriodGranularity, PivotTable, ShareRecord, top_totals};
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::constants;
use crate::provider::DatasetKind;

/// Bundled pipeline outputs to reduce function argument counts
pub struct ReportData<'a> {
    pub kind: DatasetKind,
    pub granularity: PeriodGranularity,
    pub filtered: &'a [MetricRecord],
    pub totals: &'a [CategoryTotal],
    pub shares: &'a [ShareRecord],
    pub pivot: &'a PivotTable,
}

/// Generate all CSV reports
pub fn generate_all_reports(output_dir: &Path, data: &ReportData) -> Result<()> {
    generate_pivot_csv(output_dir, data)?;
    generate_totals_csv(output_dir, data)?;
    generate_shares_csv(output_dir, data)?;

    Ok(())
}

/// Generate pivot.csv: one row per period (descending), one column per
/// category, Total last
fn generate_pivot_csv(output_dir: &Path, data: &ReportData) -> Result<()> {
    let path = output_dir.join(constants::PIVOT_FILENAME);
    let mut wtr = Writer::from_path(&path)?;

    for record in pivot_records(data.pivot, data.granularity) {
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    println!("  Generated: {}", path.display());

    Ok(())
}

/// Generate totals.csv: category, total, share of the grand total
fn generate_totals_csv(output_dir: &Path, data: &ReportData) -> Result<()> {
    let path = output_dir.join(constants::TOTALS_FILENAME);
    let mut wtr = Writer::from_path(&path)?;

    wtr.write_record(["Category", "Total", "Share_Of_Total"])?;

    let grand_total: f64 = data.totals.iter().map(|t| t.total).sum();
    for total in data.totals {
        let share = if grand_total == 0.0 {
            0.0
        } else {
            total.total / grand_total
        };

        wtr.write_record([
            total.category.as_str(),
            &format!("{:.2}", total.total),
            &format!("{:.4}", share),
        ])?;
    }

    wtr.flush()?;
    println!("  Generated: {}", path.display());

    Ok(())
}

/// Generate shares.csv: period, category, value, share of the period total
fn generate_shares_csv(output_dir: &Path, data: &ReportData) -> Result<()> {
    let path = output_dir.join(constants::SHARES_FILENAME);
    let mut wtr = Writer::from_path(&path)?;

    wtr.write_record([data.granularity.label(), "Category", "Value", "Share"])?;

    for share in data.shares {
        wtr.write_record([
            data.granularity.format(share.period).as_str(),
            &share.category,
            &format!("{:.2}", share.value),
            &format!("{:.4}", share.share),
        ])?;
    }

    wtr.flush()?;
    println!("  Generated: {}", path.display());

    Ok(())
}

/// Render the pivot table as header + data records (shared by the CSV
/// writer and the console renderer)
fn pivot_records(pivot: &PivotTable, granularity: PeriodGranularity) -> Vec<Vec<String>> {
    let mut records = Vec::with_capacity(pivot.rows.len() + 1);

    let mut header = Vec::with_capacity(pivot.categories.len() + 2);
    header.push(granularity.label().to_string());
    header.extend(pivot.categories.iter().cloned());
    header.push("Total".to_string());
    records.push(header);

    for row in &pivot.rows {
        let mut record = Vec::with_capacity(row.cells.len() + 2);
        record.push(granularity.format(row.period));
        record.extend(row.cells.iter().map(|cell| format!("{:.2}", cell)));
        record.push(format!("{:.2}", row.total));
        records.push(record);
    }

    records
}

/// Format a metric value for headline display: dollars for fees, plain for
/// throughput
fn format_value(kind: DatasetKind, value: f64) -> String {
    match kind {
        DatasetKind::Fees => format!("${:.0}", value),
        DatasetKind::Throughput => format!("{:.2}", value),
    }
}

/// Print summary to console: headline top-N totals, then the pivot table
pub fn print_summary(data: &ReportData, top_n: usize) {
    println!("\n============================================================");
    println!("              {} SUMMARY", data.kind.label().to_uppercase());
    println!("============================================================\n");

    if data.filtered.is_empty() {
        println!("No data for selection.");
        return;
    }

    for total in top_totals(data.totals, top_n) {
        println!(
            "  {} Total:  {:>14}",
            total.category,
            format_value(data.kind, total.total)
        );
    }

    println!();

    let mut builder = Builder::default();
    for record in pivot_records(data.pivot, data.granularity) {
        builder.push_record(record);
    }
    let mut table = builder.build();
    table.with(Style::sharp());
    println!("{table}");

    println!(
        "\n{} record(s), {} period(s), {} categories",
        data.filtered.len(),
        data.pivot.rows.len(),
        data.pivot.categories.len()
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use fee_metrics::pivot_by_period;

    #[test]
    fn test_pivot_records_layout() {
        let series = vec![
            MetricRecord::new(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), "ETH", 1000.0),
            MetricRecord::new(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), "BTC", 3000.0),
        ];
        let pivot = pivot_by_period(&series);

        let records = pivot_records(&pivot, PeriodGranularity::Month);
        assert_eq!(records[0], vec!["Month", "ETH", "BTC", "Total"]);
        assert_eq!(records[1], vec!["2024-01", "1000.00", "3000.00", "4000.00"]);
    }

    #[test]
    fn test_empty_pivot_still_has_header() {
        let pivot = PivotTable::default();
        let records = pivot_records(&pivot, PeriodGranularity::Day);
        assert_eq!(records, vec![vec!["Date".to_string(), "Total".to_string()]]);
    }

    #[test]
    fn test_format_value_by_dataset() {
        assert_eq!(format_value(DatasetKind::Fees, 1234.56), "$1235");
        assert_eq!(format_value(DatasetKind::Throughput, 1234.56), "1234.56");
    }
}
