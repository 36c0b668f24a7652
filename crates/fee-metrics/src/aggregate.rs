//! Aggregation stage: per-category totals and percentage-of-period shares

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::record::MetricRecord;

/// Summed value for one category
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTotal {
    pub category: String,
    pub total: f64,
}

/// A record annotated with its share of the period total
#[derive(Debug, Clone, PartialEq)]
pub struct ShareRecord {
    pub period: NaiveDate,
    pub category: String,
    pub value: f64,
    /// `value / sum(value)` over all records in the same period of the input
    /// series; 0.0 when the period total is zero
    pub share: f64,
}

/// Sum values per category, ordered by total descending.
///
/// The sort is stable, so categories with equal totals keep their
/// first-encountered input order.
pub fn totals_by_category(series: &[MetricRecord]) -> Vec<CategoryTotal> {
    let mut order: Vec<&str> = Vec::new();
    let mut sums: HashMap<&str, f64> = HashMap::new();

    for record in series {
        if !sums.contains_key(record.category.as_str()) {
            order.push(record.category.as_str());
        }
        *sums.entry(record.category.as_str()).or_insert(0.0) += record.value;
    }

    let mut totals: Vec<CategoryTotal> = order
        .into_iter()
        .map(|category| CategoryTotal {
            category: category.to_string(),
            total: sums[category],
        })
        .collect();
    totals.sort_by(|a, b| {
        b.total
            .partial_cmp(&a.total)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    totals
}

/// The leading `n` categories by total (headline metric tiles)
pub fn top_totals(totals: &[CategoryTotal], n: usize) -> &[CategoryTotal] {
    &totals[..totals.len().min(n)]
}

/// Annotate each record with its share of that period's total.
///
/// Shares are computed over the supplied series as-is: a filtered series
/// yields shares of the filtered total, never of the unfiltered data. A
/// period whose total is zero gets a 0.0 share for every record in it.
pub fn shares_by_period(series: &[MetricRecord]) -> Vec<ShareRecord> {
    let mut period_totals: HashMap<NaiveDate, f64> = HashMap::new();
    for record in series {
        *period_totals.entry(record.period).or_insert(0.0) += record.value;
    }

    series
        .iter()
        .map(|record| {
            let total = period_totals[&record.period];
            let share = if total == 0.0 {
                0.0
            } else {
                record.value / total
            };

            ShareRecord {
                period: record.period,
                category: record.category.clone(),
                value: record.value,
                share,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_totals_sorted_descending() {
        let series = vec![
            MetricRecord::new(date(2024, 1, 1), "ETH", 1000.0),
            MetricRecord::new(date(2024, 1, 1), "BTC", 3000.0),
        ];

        let totals = totals_by_category(&series);
        assert_eq!(totals.len(), 2);
        assert_eq!(totals[0].category, "BTC");
        assert_eq!(totals[0].total, 3000.0);
        assert_eq!(totals[1].category, "ETH");
        assert_eq!(totals[1].total, 1000.0);
    }

    #[test]
    fn test_totals_sum_across_periods() {
        let series = vec![
            MetricRecord::new(date(2024, 1, 1), "ETH", 1000.0),
            MetricRecord::new(date(2024, 2, 1), "ETH", 500.0),
            MetricRecord::new(date(2024, 1, 1), "BTC", 200.0),
        ];

        let totals = totals_by_category(&series);
        assert_eq!(totals[0].category, "ETH");
        assert_eq!(totals[0].total, 1500.0);
    }

    #[test]
    fn test_total_mass_conserved() {
        let series = vec![
            MetricRecord::new(date(2024, 1, 1), "ETH", 1.5),
            MetricRecord::new(date(2024, 2, 1), "BTC", 2.25),
            MetricRecord::new(date(2024, 3, 1), "SOL", 0.75),
            MetricRecord::new(date(2024, 3, 1), "ETH", 4.0),
        ];

        let summed: f64 = totals_by_category(&series).iter().map(|t| t.total).sum();
        let direct: f64 = series.iter().map(|r| r.value).sum();
        assert!((summed - direct).abs() < 1e-9);
    }

    #[test]
    fn test_ties_keep_first_encountered_order() {
        let series = vec![
            MetricRecord::new(date(2024, 1, 1), "TRX", 100.0),
            MetricRecord::new(date(2024, 1, 1), "AVAX", 100.0),
        ];

        let totals = totals_by_category(&series);
        assert_eq!(totals[0].category, "TRX");
        assert_eq!(totals[1].category, "AVAX");
    }

    #[test]
    fn test_top_totals() {
        let totals = vec![
            CategoryTotal {
                category: "BTC".to_string(),
                total: 3.0,
            },
            CategoryTotal {
                category: "ETH".to_string(),
                total: 2.0,
            },
            CategoryTotal {
                category: "SOL".to_string(),
                total: 1.0,
            },
        ];

        assert_eq!(top_totals(&totals, 2).len(), 2);
        assert_eq!(top_totals(&totals, 2)[1].category, "ETH");
        // Asking for more than exists is not an error
        assert_eq!(top_totals(&totals, 10).len(), 3);
    }

    #[test]
    fn test_shares_per_period() {
        let series = vec![
            MetricRecord::new(date(2024, 1, 1), "ETH", 1000.0),
            MetricRecord::new(date(2024, 1, 1), "BTC", 3000.0),
        ];

        let shares = shares_by_period(&series);
        assert_eq!(shares[0].share, 0.25);
        assert_eq!(shares[1].share, 0.75);
    }

    #[test]
    fn test_shares_sum_to_one_per_period() {
        let series = vec![
            MetricRecord::new(date(2024, 1, 1), "ETH", 12.5),
            MetricRecord::new(date(2024, 1, 1), "BTC", 87.1),
            MetricRecord::new(date(2024, 2, 1), "ETH", 3.0),
            MetricRecord::new(date(2024, 2, 1), "SOL", 9.0),
        ];

        let mut by_period: HashMap<NaiveDate, f64> = HashMap::new();
        for share in shares_by_period(&series) {
            *by_period.entry(share.period).or_insert(0.0) += share.share;
        }

        for (_, sum) in by_period {
            assert!((sum - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_zero_total_period_yields_zero_shares() {
        let series = vec![
            MetricRecord::new(date(2024, 1, 1), "ETH", 0.0),
            MetricRecord::new(date(2024, 1, 1), "BTC", 0.0),
        ];

        for share in shares_by_period(&series) {
            assert_eq!(share.share, 0.0);
            assert!(!share.share.is_nan());
        }
    }
}
