// tests for sql validation

use deepdive::{QueryType, Validator, classify, detect_write};

fn lenient(query: &str) -> deepdive::ValidationResult {
    Validator::new(false).validate(query)
}

fn strict(query: &str) -> deepdive::ValidationResult {
    Validator::new(true).validate(query)
}

#[test]
fn test_default_is_lenient() {
    assert!(!Validator::default().is_strict());
    assert!(Validator::new(true).is_strict());
}

#[test]
fn test_safe_select() {
    let result = lenient("SELECT * FROM users WHERE id = 1");
    assert!(result.is_valid);
    assert!(!result.is_write);
    assert_eq!(result.query_type, QueryType::Select);
    assert!(result.errors.is_empty());
    assert!(result.warnings.is_empty());
}

#[test]
fn test_write_statements() {
    let writes = [
        "INSERT INTO users VALUES (1)",
        "UPDATE users SET name = 'test'",
        "DELETE FROM users WHERE id = 1",
        "DELETE FROM users",
        "TRUNCATE TABLE users",
        "DROP TABLE users",
        "DROP DATABASE mydb",
        "ALTER TABLE users ADD COLUMN age INT",
        "CREATE TABLE test (id INT)",
        "GRANT SELECT ON users TO analyst",
        "REVOKE INSERT ON users FROM intern",
        "INSERT into users values (1)",
        "INSERT  INTO  users VALUES (1)",
    ];
    for query in writes {
        assert!(detect_write(query), "{query} should be a write");
    }
}

#[test]
fn test_reads_are_not_writes() {
    assert!(!detect_write("SELECT * FROM users"));
    assert!(!detect_write("select * from users"));
    assert!(!detect_write("  SELECT * FROM users"));
    assert!(!detect_write("WITH data AS (SELECT 1) SELECT * FROM data"));
}

#[test]
fn test_cte_with_trailing_write() {
    assert!(detect_write(
        "WITH stale AS (SELECT id FROM users) DELETE FROM users WHERE id IN (SELECT id FROM stale)"
    ));
}

#[test]
fn test_write_inside_cte_body_is_missed() {
    // known gap: the write sits inside the parens, followed by a SELECT
    let queries = [
        "WITH x AS (INSERT INTO t VALUES (1)) SELECT * FROM t",
        "WITH updated AS (UPDATE users SET active = true) SELECT * FROM users",
        "WITH gone AS (DELETE FROM users) SELECT * FROM users",
    ];
    for query in queries {
        assert!(!detect_write(query), "{query}");
    }

    let result = lenient("WITH x AS (INSERT INTO t VALUES (1)) SELECT * FROM t");
    assert!(!result.is_write);
    assert_eq!(result.query_type, QueryType::Cte);
}

#[test]
fn test_dangerous_patterns_warn_when_lenient() {
    let cases = [
        ("SELECT 1; DROP TABLE users", "DROP after semicolon"),
        ("SELECT 1; DELETE FROM users", "DELETE after semicolon"),
        ("SELECT * FROM users --", "Comment injection"),
        ("SELECT * /* comment */ FROM users", "Block comment"),
        ("SELECT * FROM users UNION SELECT * FROM admins", "UNION SELECT"),
        ("SELECT SLEEP(5)", "SLEEP function"),
        ("SELECT BENCHMARK(1000000, MD5('test'))", "BENCHMARK function"),
    ];
    for (query, expected) in cases {
        let result = lenient(query);
        assert!(
            result.warnings.iter().any(|w| w.contains(expected)),
            "{query}: {:?}",
            result.warnings
        );
        assert!(result.errors.iter().all(|e| !e.contains(expected)));
    }
}

#[test]
fn test_sleep_strict_is_error() {
    let result = strict("SELECT SLEEP(5)");
    assert!(!result.is_valid);
    assert!(result.errors.iter().any(|e| e.contains("SLEEP function")));
    assert!(result.warnings.is_empty());

    let result = lenient("SELECT SLEEP(5)");
    assert!(result.is_valid);
    assert!(result.warnings.iter().any(|w| w.contains("SLEEP function")));
}

#[test]
fn test_multiple_dangerous_patterns_each_reported() {
    let result = lenient("SELECT SLEEP(5); DROP TABLE users");
    assert_eq!(
        result.warnings,
        vec![
            "WARNING: Potential SQL injection: DROP after semicolon",
            "WARNING: SLEEP function (potential DoS)",
        ]
    );
}

#[test]
fn test_dangerous_case_insensitive() {
    let result = lenient("select sleep(5)");
    assert_eq!(result.warnings.len(), 1);
}

#[test]
fn test_nested_block_comment() {
    let result = lenient("SELECT /* outer /* inner */ */ * FROM users");
    assert!(result.warnings.iter().any(|w| w.contains("Block comment")));
}

#[test]
fn test_comment_mid_query_not_flagged() {
    // only a trailing -- counts
    let result = lenient("SELECT * FROM users -- WHERE 1=1");
    assert!(!result.warnings.iter().any(|w| w.contains("Comment injection")));
}

#[test]
fn test_common_mistakes() {
    let result = lenient("SELECT * FROM users");
    assert!(result.warnings.contains(&"Missing WHERE clause on SELECT *".to_string()));

    let result = lenient("select  *  from  users");
    assert!(result.warnings.contains(&"Missing WHERE clause on SELECT *".to_string()));

    let result = lenient("SELECT * FROM users WHERE name = NULL");
    assert!(result.warnings.contains(&"Use IS NULL instead of = NULL".to_string()));

    assert!(lenient("SELECT * FROM users WHERE name IS NULL").warnings.is_empty());
}

#[test]
fn test_mistakes_ignore_strict() {
    let result = strict("SELECT * FROM users");
    assert!(result.is_valid);
    assert_eq!(result.warnings, vec!["Missing WHERE clause on SELECT *"]);
}

#[test]
fn test_unmatched_quotes() {
    let result = lenient("SELECT * FROM users WHERE name = 'test");
    assert!(!result.is_valid);
    assert!(result.errors.contains(&"Syntax: Unmatched single quotes".to_string()));
}

#[test]
fn test_unmatched_parentheses() {
    let result = lenient("SELECT * FROM users WHERE (id = 1");
    assert!(!result.is_valid);
    assert_eq!(
        result.errors,
        vec!["Syntax: Unmatched parentheses (1 open, 0 close)"]
    );
}

#[test]
fn test_structure_ok() {
    assert!(lenient("SELECT COUNT(*) FROM (SELECT id FROM users) t").errors.is_empty());
    assert!(lenient("SELECT * FROM users WHERE name = 'test'").errors.is_empty());
    assert!(lenient(r"SELECT * FROM users WHERE name = 'O\'Brien'").errors.is_empty());
    assert!(lenient("SELECT * FROM users WHERE name = 'José'").is_valid);
}

#[test]
fn test_structure_errors_ignore_strict() {
    let query = "SELECT * FROM users WHERE name = 'test";
    assert_eq!(lenient(query).errors, strict(query).errors);
}

#[test]
fn test_classification() {
    let cases = [
        ("SELECT * FROM users", QueryType::Select),
        ("INSERT INTO users VALUES (1)", QueryType::Insert),
        ("UPDATE users SET name = 'test'", QueryType::Update),
        ("DELETE FROM users", QueryType::Delete),
        ("CREATE TABLE test (id INT)", QueryType::Create),
        ("DROP TABLE users", QueryType::Drop),
        ("ALTER TABLE users ADD COLUMN age", QueryType::Alter),
        ("WITH data AS (SELECT 1) SELECT * FROM data", QueryType::Cte),
        ("SHOW TABLES", QueryType::Other),
        ("EXPLAIN SELECT 1", QueryType::Other),
        ("   SELECT * FROM users", QueryType::Select),
        ("select * from users", QueryType::Select),
        ("\n\twith x as (select 1) select 1", QueryType::Cte),
    ];
    for (query, expected) in cases {
        assert_eq!(classify(query), expected, "{query}");
    }
}

#[test]
fn test_empty_and_blank() {
    for query in ["", "   "] {
        let result = lenient(query);
        assert!(!result.is_write);
        assert!(result.is_valid);
        assert_eq!(result.query_type, QueryType::Other);
    }
}

#[test]
fn test_reuse_has_no_leftovers() {
    let validator = Validator::new(true);
    let first = validator.validate("SELECT SLEEP(5); DROP TABLE users");
    let clean = validator.validate("SELECT id FROM users WHERE id = 1");
    let again = validator.validate("SELECT SLEEP(5); DROP TABLE users");

    assert!(clean.errors.is_empty());
    assert!(clean.warnings.is_empty());
    assert_eq!(first, again);
}

#[test]
fn test_strict_adds_exactly_dangerous_findings() {
    let queries = [
        "SELECT SLEEP(5); DROP TABLE users",
        "SELECT * FROM users WHERE (name = 'x",
        "SELECT * FROM users --",
        "SELECT * FROM users",
        "UPDATE t SET a = 1 /* hi */",
    ];
    for query in queries {
        let l = lenient(query);
        let s = strict(query);

        assert!(s.errors.len() >= l.errors.len());
        assert_eq!(l.is_valid, l.errors.is_empty());
        assert_eq!(s.is_valid, s.errors.is_empty());

        let escalated: Vec<String> = s
            .errors
            .iter()
            .filter_map(|e| e.strip_prefix("DANGER: "))
            .map(str::to_string)
            .collect();
        let demoted: Vec<String> = l
            .warnings
            .iter()
            .filter_map(|w| w.strip_prefix("WARNING: "))
            .map(str::to_string)
            .collect();
        assert_eq!(escalated, demoted, "{query}");
        assert_eq!(s.errors.len() - l.errors.len(), escalated.len());
    }
}
