//! Object-store gateway client
//!
//! Metric exports are also published as JSON/CSV blobs in a bucket behind an
//! S3-compatible HTTP gateway. Objects are fetched by key from
//! `{base_url}/{bucket}/{key}`; the listing endpoint (`{base_url}/{bucket}`
//! with a `prefix` query parameter) returns a JSON array of keys.

use anyhow::{Context, Result};
use fee_metrics::RawRow;
use thiserror::Error;

use crate::config::StoreConfig;
use crate::provider::{DataProvider, Dataset};

/// Why an object fetch failed
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("object '{key}' does not exist in bucket '{bucket}'")]
    NotFound { bucket: String, key: String },

    #[error("access denied to object '{key}' in bucket '{bucket}'")]
    AccessDenied { bucket: String, key: String },

    #[error("object store request for '{key}' failed: {message}")]
    Unexpected { key: String, message: String },
}

/// Object-store gateway client.
///
/// Holds its wiring as an explicit value constructed from [`StoreConfig`];
/// there is no shared client state anywhere else in the process.
pub struct StoreClient {
    client: reqwest::Client,
    base_url: String,
    bucket: String,
}

impl StoreClient {
    pub fn new(config: &StoreConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            bucket: config.bucket.clone(),
        }
    }

    /// Fetch an object's bytes by key
    pub async fn get(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        let url = format!("{}/{}/{}", self.base_url, self.bucket, key);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| self.unexpected(key, e.to_string()))?;

        match response.status().as_u16() {
            404 => Err(StoreError::NotFound {
                bucket: self.bucket.clone(),
                key: key.to_string(),
            }),
            403 => Err(StoreError::AccessDenied {
                bucket: self.bucket.clone(),
                key: key.to_string(),
            }),
            status if !response.status().is_success() => {
                Err(self.unexpected(key, format!("gateway returned status {}", status)))
            }
            _ => response
                .bytes()
                .await
                .map(|b| b.to_vec())
                .map_err(|e| self.unexpected(key, e.to_string())),
        }
    }

    /// List object keys in the bucket, optionally under a prefix
    pub async fn list(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let url = format!("{}/{}?prefix={}", self.base_url, self.bucket, prefix);

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| self.unexpected(prefix, e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(self.unexpected(prefix, format!("gateway returned status {}", status)));
        }

        response
            .json()
            .await
            .map_err(|e| self.unexpected(prefix, e.to_string()))
    }

    fn unexpected(&self, key: &str, message: String) -> StoreError {
        StoreError::Unexpected {
            key: key.to_string(),
            message,
        }
    }
}

impl DataProvider for StoreClient {
    async fn fetch(&self, dataset: &Dataset) -> Result<Vec<RawRow>> {
        println!(
            "  Fetching {} from bucket '{}' (key '{}')...",
            dataset.kind.label(),
            self.bucket,
            dataset.object_key
        );

        let bytes = self.get(&dataset.object_key).await?;
        let rows = decode_rows(&dataset.object_key, &bytes)?;
        println!("    Found {} rows", rows.len());

        Ok(rows)
    }
}

// =============================================================================
// Payload Decoding
// =============================================================================

/// Decode an export payload into raw rows, picking the codec by key extension
pub fn decode_rows(key: &str, bytes: &[u8]) -> Result<Vec<RawRow>> {
    if key.ends_with(".csv") {
        parse_csv_rows(bytes)
    } else {
        parse_json_rows(bytes)
    }
}

/// Parse a JSON export: a top-level array of objects
pub fn parse_json_rows(bytes: &[u8]) -> Result<Vec<RawRow>> {
    serde_json::from_slice(bytes).context("Failed to parse JSON export (expected array of objects)")
}

/// Parse a CSV export: header row names the columns.
///
/// Cells that parse as numbers become JSON numbers so the normalization
/// stage sees the same shapes it gets from Dune; everything else stays a
/// string.
pub fn parse_csv_rows(bytes: &[u8]) -> Result<Vec<RawRow>> {
    let mut reader = csv::Reader::from_reader(bytes);
    let headers = reader
        .headers()
        .context("Failed to read CSV header row")?
        .clone();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.context("Failed to read CSV record")?;

        let mut row = RawRow::new();
        for (header, field) in headers.iter().zip(record.iter()) {
            row.insert(header.to_string(), csv_cell_value(field));
        }
        rows.push(row);
    }

    Ok(rows)
}

fn csv_cell_value(field: &str) -> serde_json::Value {
    if let Ok(number) = field.trim().parse::<f64>() {
        if let Some(n) = serde_json::Number::from_f64(number) {
            return serde_json::Value::Number(n);
        }
    }
    serde_json::Value::String(field.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_json_rows() {
        let payload = br#"[
            {"month": "2024-01", "category": "ETH", "gas_fees": 1000.5},
            {"month": "2024-01", "category": "BTC", "gas_fees": 3000}
        ]"#;

        let rows = parse_json_rows(payload).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["category"], "ETH");
        assert_eq!(rows[1]["gas_fees"], 3000);
    }

    #[test]
    fn test_parse_json_rejects_non_array() {
        assert!(parse_json_rows(br#"{"rows": []}"#).is_err());
    }

    #[test]
    fn test_parse_csv_rows() {
        let payload = b"block_date,blockchain,tps\n2024-03-15,SOL,4021.7\n2024-03-15,ETH,12.3\n";

        let rows = parse_csv_rows(payload).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["blockchain"], "SOL");
        assert_eq!(rows[0]["tps"], 4021.7);
        // Dates stay strings for the normalization stage to parse
        assert_eq!(rows[1]["block_date"], "2024-03-15");
    }

    #[test]
    fn test_decode_picks_codec_by_extension() {
        let csv_payload = b"month,category,gas_fees\n2024-01,ETH,1000\n";
        let rows = decode_rows("fees.csv", csv_payload).unwrap();
        assert_eq!(rows[0]["gas_fees"], 1000.0);

        let json_payload = br#"[{"month": "2024-01", "category": "ETH", "gas_fees": 1000}]"#;
        let rows = decode_rows("fees.json", json_payload).unwrap();
        assert_eq!(rows[0]["gas_fees"], 1000);
    }
}
