//! Filter, aggregation, and pivot pipeline for blockchain metric series
//!
//! Raw tabular rows come in from a data provider (Dune query results or
//! object-store exports), get normalized into a [`MetricSeries`], and flow
//! through the stages:
//!
//! - [`normalize`]: coerce the period column to a calendar date, validate
//!   required columns
//! - [`filter_series`]: inclusive date range + category selection
//! - [`totals_by_category`] / [`shares_by_period`]: per-category sums and
//!   percentage-of-period shares
//! - [`pivot_by_period`]: period x category matrix with a Total column
//!
//! Every stage is a pure function from its input to a new value. Nothing is
//! cached or mutated in place; callers recompute on every criteria change.

pub mod aggregate;
pub mod filter;
pub mod pivot;
pub mod record;
pub mod schema;

pub use aggregate::{CategoryTotal, ShareRecord, shares_by_period, top_totals, totals_by_category};
pub use filter::{FilterCriteria, filter_series};
pub use pivot::{PivotRow, PivotTable, pivot_by_period};
pub use record::{MetricRecord, MetricSeries, PeriodGranularity};
pub use schema::{DAILY_THROUGHPUT, MONTHLY_FEES, RawRow, SchemaError, TableSchema, normalize};
