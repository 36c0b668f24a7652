//! Data provider contract
//!
//! Exactly one provider backend is selected at startup and used for every
//! fetch; capabilities are never probed per call. A provider either returns
//! the raw rows backing a dataset or fails — degrading a failure to an empty
//! dataset is the caller's decision, not the provider's.

use anyhow::Result;
use clap::ValueEnum;
use fee_metrics::{DAILY_THROUGHPUT, MONTHLY_FEES, RawRow, TableSchema};

use crate::config::Config;

/// Which metric table to fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DatasetKind {
    /// Monthly gas fees per blockchain
    Fees,
    /// Daily transactions-per-second per blockchain
    Throughput,
}

impl DatasetKind {
    pub fn label(&self) -> &'static str {
        match self {
            DatasetKind::Fees => "monthly gas fees",
            DatasetKind::Throughput => "daily throughput",
        }
    }
}

/// One fetchable metric table: its schema plus per-backend addressing
#[derive(Debug, Clone)]
pub struct Dataset {
    pub kind: DatasetKind,
    pub schema: TableSchema,
    /// Saved Dune query id for this table
    pub query_id: u64,
    /// Object key for this table's export in the metrics bucket
    pub object_key: String,
}

impl Dataset {
    pub fn from_config(kind: DatasetKind, config: &Config) -> Self {
        match kind {
            DatasetKind::Fees => Self {
                kind,
                schema: MONTHLY_FEES,
                query_id: config.queries.tx_fees,
                object_key: config.store.fee_object.clone(),
            },
            DatasetKind::Throughput => Self {
                kind,
                schema: DAILY_THROUGHPUT,
                query_id: config.queries.throughput,
                object_key: config.store.throughput_object.clone(),
            },
        }
    }
}

/// A source of raw metric rows
pub trait DataProvider {
    /// Fetch the raw rows backing `dataset`, or fail
    async fn fetch(&self, dataset: &Dataset) -> Result<Vec<RawRow>>;
}
