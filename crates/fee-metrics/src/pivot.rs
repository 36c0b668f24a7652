//! Shaping stage: period x category pivot with a derived Total column

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::record::MetricRecord;

/// One pivot row: a period and one cell per pivot category
#[derive(Debug, Clone, PartialEq)]
pub struct PivotRow {
    pub period: NaiveDate,
    /// Indexed by [`PivotTable::categories`]; zero-filled where the
    /// (period, category) pair is absent from the input
    pub cells: Vec<f64>,
    /// Row-wise sum across all category cells
    pub total: f64,
}

/// Filtered records reshaped into a period x category matrix.
///
/// Columns are the distinct categories present in the input (not the full
/// category universe), rows are the distinct periods sorted descending for
/// display.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PivotTable {
    /// Column order: first-seen input order
    pub categories: Vec<String>,
    pub rows: Vec<PivotRow>,
}

impl PivotTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Pivot a series into a period x category matrix.
///
/// The pivot is a grouped aggregation: records sharing a (period, category)
/// pair are summed, not overwritten. Cells with no matching record are 0.0,
/// which keeps `total` equal to the row sum arithmetically.
pub fn pivot_by_period(series: &[MetricRecord]) -> PivotTable {
    let mut categories: Vec<String> = Vec::new();
    let mut columns: HashMap<&str, usize> = HashMap::new();
    for record in series {
        if !columns.contains_key(record.category.as_str()) {
            columns.insert(record.category.as_str(), categories.len());
            categories.push(record.category.clone());
        }
    }

    let mut periods: Vec<NaiveDate> = Vec::new();
    let mut cells: HashMap<NaiveDate, Vec<f64>> = HashMap::new();
    for record in series {
        let row = cells.entry(record.period).or_insert_with(|| {
            periods.push(record.period);
            vec![0.0; categories.len()]
        });
        row[columns[record.category.as_str()]] += record.value;
    }

    periods.sort_unstable();
    periods.reverse();

    let rows = periods
        .into_iter()
        .map(|period| {
            let cells = cells.remove(&period).unwrap_or_default();
            let total = cells.iter().sum();
            PivotRow {
                period,
                cells,
                total,
            }
        })
        .collect();

    PivotTable { categories, rows }
}
