// output formatting - readable summary or raw json

use crate::ValidationResult;

pub struct Output;

impl Output {
    /// Text report. The ERRORS and WARNINGS blocks only appear when they
    /// have entries.
    pub fn summary(result: &ValidationResult) -> String {
        let mut lines = vec![
            format!("Query Type: {}", result.query_type),
            format!(
                "Write Operation: {}",
                if result.is_write { "Yes" } else { "No" }
            ),
            format!("Valid: {}", if result.is_valid { "✓" } else { "✗" }),
        ];

        if !result.errors.is_empty() {
            lines.push("\nERRORS:".to_string());
            for error in &result.errors {
                lines.push(format!("  ✗ {error}"));
            }
        }

        if !result.warnings.is_empty() {
            lines.push("\nWARNINGS:".to_string());
            for warning in &result.warnings {
                lines.push(format!("  ⚠ {warning}"));
            }
        }

        lines.join("\n")
    }

    // for humans
    pub fn pretty(result: &ValidationResult) {
        println!("{}", Self::summary(result));
    }

    // for scripts
    pub fn raw(result: &ValidationResult) {
        println!("{}", serde_json::to_string(result).unwrap_or_default());
    }
}
