// sql safety lint
// pattern matching over the raw text, not a parser. it flags the usual
// suspects but a clean result does not prove a query is safe

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use super::rules::{
    CLASSIFIERS, CTE_WRITE, DANGEROUS, MISTAKES, SELECT, SELECT_FROM, SELECT_LITERAL, WRITES,
};

/// Default row count above which a write counts as a batch operation.
pub const DEFAULT_BATCH_THRESHOLD: u64 = 1000;

/// Statement kind, decided by the leading keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum QueryType {
    Select,
    Insert,
    Update,
    Delete,
    Create,
    Drop,
    Alter,
    Cte,
    Other,
}

impl QueryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Select => "SELECT",
            Self::Insert => "INSERT",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
            Self::Create => "CREATE",
            Self::Drop => "DROP",
            Self::Alter => "ALTER",
            Self::Cte => "CTE",
            Self::Other => "OTHER",
        }
    }
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one `Validator::validate` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub is_write: bool,
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub query_type: QueryType,
}

impl ValidationResult {
    /// Appends an advisory message after validation, e.g. batch-size advice.
    /// Warnings never change validity.
    pub fn push_warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }
}

/// Settings shared by the cli and server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatorConfig {
    /// escalate dangerous patterns from warnings to errors
    pub strict: bool,
    pub batch_threshold: u64,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            strict: false,
            batch_threshold: DEFAULT_BATCH_THRESHOLD,
        }
    }
}

// errors and warnings collected during a single call
#[derive(Default)]
struct Findings {
    errors: Vec<String>,
    warnings: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Validator {
    strict: bool,
}

impl Validator {
    pub fn new(strict: bool) -> Self {
        Self { strict }
    }

    pub fn from_config(config: &ValidatorConfig) -> Self {
        Self::new(config.strict)
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Runs every check against `query`.
    ///
    /// Malformed sql is reported through the result, never as an error.
    /// Each call starts from empty findings, so one validator can be reused
    /// for any number of queries.
    pub fn validate(&self, query: &str) -> ValidationResult {
        let mut findings = Findings::default();

        let is_write = detect_write(query);
        self.check_dangerous(query, &mut findings);
        check_mistakes(query, &mut findings);
        check_structure(query, &mut findings);
        let query_type = classify(query);

        debug!(
            %query_type,
            is_write,
            errors = findings.errors.len(),
            warnings = findings.warnings.len(),
            "validated query"
        );

        ValidationResult {
            is_write,
            is_valid: findings.errors.is_empty(),
            errors: findings.errors,
            warnings: findings.warnings,
            query_type,
        }
    }

    fn check_dangerous(&self, query: &str, findings: &mut Findings) {
        for rule in DANGEROUS.iter() {
            if !rule.regex.is_match(query) {
                continue;
            }
            debug!(rule = rule.message, strict = self.strict, "dangerous pattern");
            if self.strict {
                findings.errors.push(format!("DANGER: {}", rule.message));
            } else {
                findings.warnings.push(format!("WARNING: {}", rule.message));
            }
        }
    }
}

/// Whether `query` mutates data or schema.
///
/// Only the leading keyword is considered, plus one CTE shape where the
/// write follows the `WITH name AS (...)` body. A write nested inside the
/// CTE body is not detected:
///
/// ```
/// use deepdive::detect_write;
///
/// assert!(detect_write("with x as (select 1) delete from t"));
/// assert!(!detect_write("WITH x AS (INSERT INTO t VALUES (1)) SELECT * FROM t"));
/// ```
pub fn detect_write(query: &str) -> bool {
    let query = query.trim();
    WRITES.iter().any(|re| re.is_match(query)) || CTE_WRITE.is_match(query)
}

/// Classifies by leading keyword, `OTHER` when nothing matches.
pub fn classify(query: &str) -> QueryType {
    let query = query.trim();
    CLASSIFIERS
        .iter()
        .find(|(re, _)| re.is_match(query))
        .map(|(_, kind)| *kind)
        .unwrap_or(QueryType::Other)
}

fn check_mistakes(query: &str, findings: &mut Findings) {
    for rule in MISTAKES.iter() {
        if rule.regex.is_match(query) {
            debug!(rule = rule.message, "common mistake");
            findings.warnings.push(rule.message.to_string());
        }
    }
}

fn check_structure(query: &str, findings: &mut Findings) {
    let open = query.matches('(').count();
    let close = query.matches(')').count();
    if open != close {
        findings.errors.push(format!(
            "Syntax: Unmatched parentheses ({open} open, {close} close)"
        ));
    }

    // a quote right after a backslash counts as escaped; one level only
    let quotes = query.matches('\'').count() - query.matches("\\'").count();
    if quotes % 2 != 0 {
        findings.errors.push("Syntax: Unmatched single quotes".to_string());
    }

    // SELECT without FROM is allowed for now (SELECT 1, SELECT now())
    if SELECT.is_match(query) && !SELECT_FROM.is_match(query) && !SELECT_LITERAL.is_match(query) {
        debug!("select without from");
    }
}
