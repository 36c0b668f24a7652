//! Dune Analytics API integration
//!
//! The dashboard reads saved Dune queries by id: fetch the latest results,
//! and while an execution is still running, poll at a fixed interval with a
//! bounded attempt count.
//!
//! API docs: https://docs.dune.com/api-reference/executions/endpoint/get-query-result

use std::time::Duration;

use anyhow::{Context, Result};
use fee_metrics::RawRow;
use serde::Deserialize;
use tokio::time::sleep;

use crate::constants;
use crate::provider::{DataProvider, Dataset};

// =============================================================================
// API Types
// =============================================================================

/// Response from getting query results
#[derive(Deserialize)]
struct ResultsResponse {
    state: String,
    result: Option<QueryResult>,
    error: Option<String>,
}

/// Query result data
#[derive(Deserialize)]
struct QueryResult {
    rows: Vec<RawRow>,
}

// =============================================================================
// Dune Client
// =============================================================================

/// Dune Analytics API client
pub struct DuneClient {
    api_key: String,
    client: reqwest::Client,
}

impl DuneClient {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            client: reqwest::Client::new(),
        }
    }

    /// Get the current result state for a saved query
    async fn get_results(&self, query_id: u64) -> Result<ResultsResponse> {
        let url = format!("{}/query/{}/results", constants::DUNE_API_BASE, query_id);

        self.client
            .get(&url)
            .header("X-Dune-Api-Key", &self.api_key)
            .send()
            .await
            .context("Failed to get Dune results")?
            .json()
            .await
            .context("Failed to parse Dune results response")
    }

    /// Fetch the rows of a saved query, waiting out a running execution.
    ///
    /// Polls at a fixed interval for a fixed maximum attempt count; a query
    /// still executing after the last poll is an error, as is a failed or
    /// cancelled execution.
    pub async fn fetch_rows(&self, query_id: u64) -> Result<Vec<RawRow>> {
        for attempt in 0..constants::MAX_POLL_ATTEMPTS {
            if attempt > 0 {
                sleep(Duration::from_secs(constants::POLL_INTERVAL_SECS)).await;
            }

            let response = self.get_results(query_id).await?;
            match response.state.as_str() {
                "QUERY_STATE_COMPLETED" => {
                    if let Some(result) = response.result {
                        return Ok(result.rows);
                    }
                    return Ok(Vec::new());
                }
                "QUERY_STATE_FAILED" | "QUERY_STATE_CANCELLED" => {
                    let error = response
                        .error
                        .unwrap_or_else(|| "Unknown error".to_string());
                    anyhow::bail!("Query {} failed: {}", query_id, error);
                }
                state => {
                    println!("    Status: {}...", state);
                }
            }
        }

        anyhow::bail!(
            "Query {} still executing after {} polls ({}s apart)",
            query_id,
            constants::MAX_POLL_ATTEMPTS,
            constants::POLL_INTERVAL_SECS
        );
    }
}

impl DataProvider for DuneClient {
    async fn fetch(&self, dataset: &Dataset) -> Result<Vec<RawRow>> {
        println!(
            "  Querying Dune for {} (query {})...",
            dataset.kind.label(),
            dataset.query_id
        );

        let rows = self.fetch_rows(dataset.query_id).await?;
        println!("    Found {} rows", rows.len());

        Ok(rows)
    }
}
