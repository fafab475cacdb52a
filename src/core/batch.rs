// batch size advice for writes that touch a lot of rows

use serde::Serialize;
use tracing::debug;

use super::validator::{DEFAULT_BATCH_THRESHOLD, detect_write};

const SUGGESTION: &str = "Consider adding WHERE clause or LIMIT";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchCheckResult {
    pub is_batch: bool,
    pub affected_rows: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub threshold: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl BatchCheckResult {
    /// Same as [`BatchCheckResult::with_threshold`] using the default of 1000 rows.
    pub fn check(query: &str, estimated_rows: u64) -> Self {
        Self::with_threshold(query, estimated_rows, DEFAULT_BATCH_THRESHOLD)
    }

    /// Flags a write whose estimated row count is strictly above `threshold`.
    /// Reads are never flagged.
    pub fn with_threshold(query: &str, estimated_rows: u64, threshold: u64) -> Self {
        if detect_write(query) && estimated_rows > threshold {
            debug!(estimated_rows, threshold, "batch write");
            return Self {
                is_batch: true,
                affected_rows: estimated_rows,
                threshold: Some(threshold),
                warning: Some(format!(
                    "This operation affects {estimated_rows} rows (threshold: {threshold})"
                )),
                suggestion: Some(SUGGESTION.to_string()),
            };
        }

        Self {
            is_batch: false,
            affected_rows: estimated_rows,
            threshold: None,
            warning: None,
            suggestion: None,
        }
    }

    /// Messages a caller appends to the validation warnings, empty when not a batch.
    pub fn messages(&self) -> Vec<String> {
        let mut out = Vec::new();
        if let Some(warning) = &self.warning {
            out.push(warning.clone());
        }
        if let Some(suggestion) = &self.suggestion {
            out.push(format!("Suggestion: {suggestion}"));
        }
        out
    }
}
