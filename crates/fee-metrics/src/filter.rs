//! Filter stage: inclusive date range plus category selection

use std::collections::HashSet;

use chrono::NaiveDate;

use crate::record::{MetricRecord, MetricSeries};

/// One user selection: an inclusive date range and a set of category labels.
///
/// Constructed per interaction and immutable once applied. Both bounds
/// compare on the calendar date only (periods carry no time of day after
/// normalization).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCriteria {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub categories: HashSet<String>,
}

impl FilterCriteria {
    /// Criteria matching everything in `series`: the full period span and
    /// every category present. These are the first-load defaults; returns
    /// `None` for an empty series.
    pub fn covering(series: &[MetricRecord]) -> Option<Self> {
        let start = series.iter().map(|r| r.period).min()?;
        let end = series.iter().map(|r| r.period).max()?;
        let categories = series.iter().map(|r| r.category.clone()).collect();

        Some(Self {
            start,
            end,
            categories,
        })
    }

    pub fn matches(&self, record: &MetricRecord) -> bool {
        self.start <= record.period
            && record.period <= self.end
            && self.categories.contains(&record.category)
    }
}

/// Keep the records within the date range whose category is selected.
///
/// Input order is preserved. An empty category set yields an empty result,
/// not an error.
pub fn filter_series(series: &[MetricRecord], criteria: &FilterCriteria) -> MetricSeries {
    series
        .iter()
        .filter(|record| criteria.matches(record))
        .cloned()
        .collect()
}
