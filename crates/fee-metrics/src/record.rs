//! Metric series primitives shared by all pipeline stages

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One observation: a time bucket, a blockchain label, and a value.
///
/// Values are non-negative in practice (fees, transactions per second) but
/// the pipeline does not enforce that.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    pub period: NaiveDate,
    pub category: String,
    pub value: f64,
}

impl MetricRecord {
    pub fn new(period: NaiveDate, category: impl Into<String>, value: f64) -> Self {
        Self {
            period,
            category: category.into(),
            value,
        }
    }
}

/// An ordered collection of records sharing one schema.
///
/// Input order is meaningful (the filter stage preserves it, the pivot stage
/// derives its column order from it), but the series is not required to be
/// sorted by period.
pub type MetricSeries = Vec<MetricRecord>;

/// Time-bucket granularity of a metric table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodGranularity {
    /// One bucket per calendar month (periods are first-of-month dates)
    Month,
    /// One bucket per calendar day
    Day,
}

impl PeriodGranularity {
    /// Render a period for display: `YYYY-MM` for monthly tables,
    /// `YYYY-MM-DD` for daily ones.
    pub fn format(&self, period: NaiveDate) -> String {
        match self {
            PeriodGranularity::Month => period.format("%Y-%m").to_string(),
            PeriodGranularity::Day => period.format("%Y-%m-%d").to_string(),
        }
    }

    /// Column header for the period axis
    pub fn label(&self) -> &'static str {
        match self {
            PeriodGranularity::Month => "Month",
            PeriodGranularity::Day => "Date",
        }
    }
}
