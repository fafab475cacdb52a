// pattern tables for the validator
// every pattern carries (?i) so matching is case-insensitive in one place

use regex::Regex;
use std::sync::LazyLock;

use super::validator::QueryType;

/// A compiled pattern with the message reported when it matches.
pub(crate) struct Rule {
    pub regex: Regex,
    pub message: &'static str,
}

// statement-leading keywords that mutate data or schema
const WRITE_PATTERNS: [&str; 10] = [
    r"(?i)^\s*INSERT\s+INTO",
    r"(?i)^\s*UPDATE\s+",
    r"(?i)^\s*DELETE\s+FROM",
    r"(?i)^\s*DELETE\s+",
    r"(?i)^\s*TRUNCATE\s+TABLE",
    r"(?i)^\s*DROP\s+",
    r"(?i)^\s*ALTER\s+TABLE",
    r"(?i)^\s*CREATE\s+",
    r"(?i)^\s*GRANT\s+",
    r"(?i)^\s*REVOKE\s+",
];

// the body span is greedy, so a write living inside the parens followed by
// a trailing SELECT never matches
const CTE_WRITE_PATTERN: &str = r"(?is)WITH\s+\w+\s+AS\s*\(.*\)\s*(INSERT|UPDATE|DELETE)";

const DANGEROUS_PATTERNS: [(&str, &str); 7] = [
    (r"(?i);\s*DROP\s+", "Potential SQL injection: DROP after semicolon"),
    (r"(?i);\s*DELETE\s+", "Potential SQL injection: DELETE after semicolon"),
    (r"(?i)--\s*$", "Comment injection attempt"),
    (r"(?i)/\*.*\*/", "Block comment (potential injection)"),
    (r"(?i)UNION\s+SELECT", "UNION SELECT (potential data extraction)"),
    (r"(?i)SLEEP\s*\(", "SLEEP function (potential DoS)"),
    (r"(?i)BENCHMARK\s*\(", "BENCHMARK function (potential DoS)"),
];

// the GROUP BY rule is a loose heuristic and misses most real cases
const COMMON_MISTAKES: [(&str, &str); 3] = [
    (r"(?i)SELECT\s+\*\s+FROM\s+\w+\s*$", "Missing WHERE clause on SELECT *"),
    (r"(?i)WHERE\s+\w+\s*=\s*NULL", "Use IS NULL instead of = NULL"),
    (
        r"(?i)GROUP\s+BY\s+\w+\s+SELECT\s+.*[^,]\s+\w+\s*,",
        "Missing aggregation on non-GROUP BY column",
    ),
];

// first match wins, so order is priority
const CLASSIFY_PATTERNS: [(&str, QueryType); 8] = [
    (r"(?i)^\s*SELECT", QueryType::Select),
    (r"(?i)^\s*INSERT", QueryType::Insert),
    (r"(?i)^\s*UPDATE", QueryType::Update),
    (r"(?i)^\s*DELETE", QueryType::Delete),
    (r"(?i)^\s*CREATE", QueryType::Create),
    (r"(?i)^\s*DROP", QueryType::Drop),
    (r"(?i)^\s*ALTER", QueryType::Alter),
    (r"(?i)^\s*WITH", QueryType::Cte),
];

// select with no FROM; evaluated by the structure check but not reported yet
const SELECT_PATTERN: &str = r"(?i)SELECT\s+";
const SELECT_FROM_PATTERN: &str = r"(?i)SELECT\s+.*\s+FROM\s+";
const SELECT_LITERAL_PATTERN: &str = r"(?i)SELECT\s+\d+\s*$";

fn compile(pattern: &str) -> Regex {
    // patterns are compile-time constants, a failure here is a typo in this file
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid built-in pattern {pattern}: {e}"))
}

fn compile_rules(table: &[(&str, &'static str)]) -> Vec<Rule> {
    table
        .iter()
        .map(|&(pattern, message)| Rule {
            regex: compile(pattern),
            message,
        })
        .collect()
}

pub(crate) static WRITES: LazyLock<Vec<Regex>> =
    LazyLock::new(|| WRITE_PATTERNS.iter().map(|p| compile(p)).collect());

pub(crate) static CTE_WRITE: LazyLock<Regex> = LazyLock::new(|| compile(CTE_WRITE_PATTERN));

pub(crate) static DANGEROUS: LazyLock<Vec<Rule>> =
    LazyLock::new(|| compile_rules(&DANGEROUS_PATTERNS));

pub(crate) static MISTAKES: LazyLock<Vec<Rule>> = LazyLock::new(|| compile_rules(&COMMON_MISTAKES));

pub(crate) static CLASSIFIERS: LazyLock<Vec<(Regex, QueryType)>> = LazyLock::new(|| {
    CLASSIFY_PATTERNS
        .iter()
        .map(|&(pattern, kind)| (compile(pattern), kind))
        .collect()
});

pub(crate) static SELECT: LazyLock<Regex> = LazyLock::new(|| compile(SELECT_PATTERN));
pub(crate) static SELECT_FROM: LazyLock<Regex> = LazyLock::new(|| compile(SELECT_FROM_PATTERN));
pub(crate) static SELECT_LITERAL: LazyLock<Regex> =
    LazyLock::new(|| compile(SELECT_LITERAL_PATTERN));
