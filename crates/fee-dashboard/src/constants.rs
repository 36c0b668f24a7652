//! Centralized constants for the fee dashboard
//!
//! Deployment-specific values (API keys, bucket names, query ids) live in
//! config.toml; everything here is universal.

// =============================================================================
// API Endpoints
// =============================================================================

/// Dune API base URL
pub const DUNE_API_BASE: &str = "https://api.dune.com/api/v1";

// =============================================================================
// Polling
// =============================================================================

/// Fixed interval between result polls while a query execution is running
pub const POLL_INTERVAL_SECS: u64 = 10;

/// Maximum number of result polls before giving up on an execution
pub const MAX_POLL_ATTEMPTS: u32 = 10;

// =============================================================================
// File Names
// =============================================================================

/// Pivot table CSV filename
pub const PIVOT_FILENAME: &str = "pivot.csv";

/// Per-category totals CSV filename
pub const TOTALS_FILENAME: &str = "totals.csv";

/// Percentage-of-period shares CSV filename
pub const SHARES_FILENAME: &str = "shares.csv";
