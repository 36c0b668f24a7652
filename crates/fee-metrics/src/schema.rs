//! Raw provider rows and the normalization stage
//!
//! Providers return untyped rows (column name -> JSON value). Normalization
//! checks that every required column is present, coerces the period column to
//! a calendar date, and produces the typed series the rest of the pipeline
//! consumes. A normalization failure is terminal for the dataset: no partial
//! series is produced.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use thiserror::Error;

use crate::record::{MetricRecord, MetricSeries, PeriodGranularity};

/// One untyped row as returned by a data provider
pub type RawRow = HashMap<String, serde_json::Value>;

/// Column mapping for one known metric table shape
#[derive(Debug, Clone)]
pub struct TableSchema {
    pub period_column: &'static str,
    pub category_column: &'static str,
    pub value_column: &'static str,
    pub granularity: PeriodGranularity,
}

/// Monthly gas fees per blockchain: `month`, `category`, `gas_fees`
pub const MONTHLY_FEES: TableSchema = TableSchema {
    period_column: "month",
    category_column: "category",
    value_column: "gas_fees",
    granularity: PeriodGranularity::Month,
};

/// Daily throughput per blockchain: `block_date`, `blockchain`, `tps`
pub const DAILY_THROUGHPUT: TableSchema = TableSchema {
    period_column: "block_date",
    category_column: "blockchain",
    value_column: "tps",
    granularity: PeriodGranularity::Day,
};

/// Why a dataset failed normalization
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("missing columns in data: {}", columns.join(", "))]
    MissingColumns { columns: Vec<String> },

    #[error("column '{column}' has unparseable value: {value}")]
    BadValue { column: String, value: String },
}

/// Normalize raw provider rows into a typed series.
///
/// Required columns are checked against the first row (all rows of a query
/// result share one shape); every missing column is named in the error. An
/// empty input is a valid empty series, not an error.
pub fn normalize(rows: &[RawRow], schema: &TableSchema) -> Result<MetricSeries, SchemaError> {
    let Some(first) = rows.first() else {
        return Ok(Vec::new());
    };

    let required = [
        schema.period_column,
        schema.category_column,
        schema.value_column,
    ];
    let missing: Vec<String> = required
        .iter()
        .filter(|column| !first.contains_key(**column))
        .map(|column| column.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(SchemaError::MissingColumns { columns: missing });
    }

    let mut series = Vec::with_capacity(rows.len());
    for row in rows {
        let period = parse_period_value(row, schema.period_column, schema.granularity)?;
        let category = row
            .get(schema.category_column)
            .and_then(|v| v.as_str())
            .ok_or_else(|| bad_value(row, schema.category_column))?;
        let value = parse_numeric_value(row, schema.value_column)?;

        series.push(MetricRecord::new(period, category, value));
    }

    Ok(series)
}

/// Coerce a period cell to a calendar date.
///
/// Accepted forms: `YYYY-MM` (month granularity), `YYYY-MM-DD`, RFC 3339
/// timestamps, and the `YYYY-MM-DD HH:MM:SS.mmm UTC` form Dune exports use.
/// Any time-of-day component is discarded; monthly tables are additionally
/// snapped to the first of the month so mid-month timestamps group together.
fn parse_period_value(
    row: &RawRow,
    column: &str,
    granularity: PeriodGranularity,
) -> Result<NaiveDate, SchemaError> {
    let raw = row
        .get(column)
        .and_then(|v| v.as_str())
        .ok_or_else(|| bad_value(row, column))?;

    let date = parse_period(raw).ok_or_else(|| bad_value(row, column))?;

    match granularity {
        // with_day(1) cannot fail for a date that already exists
        PeriodGranularity::Month => Ok(date.with_day(1).unwrap_or(date)),
        PeriodGranularity::Day => Ok(date),
    }
}

fn parse_period(raw: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(date) = NaiveDate::parse_from_str(&format!("{raw}-01"), "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.3f UTC") {
        return Some(dt.date());
    }
    None
}

/// Extract a numeric cell, accepting JSON numbers and numeric strings
fn parse_numeric_value(row: &RawRow, column: &str) -> Result<f64, SchemaError> {
    let cell = row.get(column).ok_or_else(|| bad_value(row, column))?;

    cell.as_f64()
        .or_else(|| cell.as_str().and_then(|s| s.trim().parse().ok()))
        .ok_or_else(|| bad_value(row, column))
}

fn bad_value(row: &RawRow, column: &str) -> SchemaError {
    let value = row
        .get(column)
        .map(|v| v.to_string())
        .unwrap_or_else(|| "null".to_string());
    SchemaError::BadValue {
        column: column.to_string(),
        value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fee_row(month: &str, category: &str, gas_fees: serde_json::Value) -> RawRow {
        let mut row = RawRow::new();
        row.insert("month".to_string(), json!(month));
        row.insert("category".to_string(), json!(category));
        row.insert("gas_fees".to_string(), gas_fees);
        row
    }

    #[test]
    fn test_normalize_monthly_fees() {
        let rows = vec![
            fee_row("2024-01", "ETH", json!(1000.0)),
            fee_row("2024-02", "BTC", json!(3000)),
        ];

        let series = normalize(&rows, &MONTHLY_FEES).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].period, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(series[0].category, "ETH");
        assert_eq!(series[0].value, 1000.0);
        assert_eq!(series[1].value, 3000.0);
    }

    #[test]
    fn test_empty_input_is_empty_series() {
        assert_eq!(normalize(&[], &MONTHLY_FEES).unwrap(), Vec::new());
    }

    #[test]
    fn test_missing_columns_all_named() {
        let mut row = RawRow::new();
        row.insert("month".to_string(), json!("2024-01"));
        row.insert("unrelated".to_string(), json!(1));

        let err = normalize(&[row], &MONTHLY_FEES).unwrap_err();
        assert_eq!(
            err,
            SchemaError::MissingColumns {
                columns: vec!["category".to_string(), "gas_fees".to_string()],
            }
        );
    }

    #[test]
    fn test_period_forms() {
        for raw in [
            "2024-01",
            "2024-01-01",
            "2024-01-01T00:00:00+00:00",
            "2024-01-01 00:00:00.000 UTC",
        ] {
            let rows = vec![fee_row(raw, "ETH", json!(1.0))];
            let series = normalize(&rows, &MONTHLY_FEES).unwrap();
            assert_eq!(
                series[0].period,
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                "failed for {raw}"
            );
        }
    }

    #[test]
    fn test_monthly_periods_snap_to_first_of_month() {
        let rows = vec![fee_row("2024-01-15", "ETH", json!(1.0))];
        let series = normalize(&rows, &MONTHLY_FEES).unwrap();
        assert_eq!(series[0].period, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    }

    #[test]
    fn test_daily_periods_keep_the_day() {
        let mut row = RawRow::new();
        row.insert("block_date".to_string(), json!("2024-03-15"));
        row.insert("blockchain".to_string(), json!("SOL"));
        row.insert("tps".to_string(), json!(4021.7));

        let series = normalize(&[row], &DAILY_THROUGHPUT).unwrap();
        assert_eq!(series[0].period, NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
        assert_eq!(series[0].category, "SOL");
    }

    #[test]
    fn test_numeric_strings_accepted() {
        let rows = vec![fee_row("2024-01", "ETH", json!("1234.5"))];
        let series = normalize(&rows, &MONTHLY_FEES).unwrap();
        assert_eq!(series[0].value, 1234.5);
    }

    #[test]
    fn test_bad_period_fails() {
        let rows = vec![fee_row("january", "ETH", json!(1.0))];
        let err = normalize(&rows, &MONTHLY_FEES).unwrap_err();
        assert!(matches!(err, SchemaError::BadValue { column, .. } if column == "month"));
    }

    #[test]
    fn test_bad_value_fails() {
        let rows = vec![fee_row("2024-01", "ETH", json!("lots"))];
        let err = normalize(&rows, &MONTHLY_FEES).unwrap_err();
        assert!(matches!(err, SchemaError::BadValue { column, .. } if column == "gas_fees"));
    }
}
