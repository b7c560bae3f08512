//! Static SQL validation
//!
//! Second, independent rejection point. The check is lexical, not semantic:
//! forbidden keywords, a single-statement bound, and an allowlist over the
//! identifiers that follow FROM/JOIN. It does not see subqueries, CTEs, or
//! quoted identifiers; that limitation is accepted, not patched.

use crate::catalog::SchemaCatalog;
use lazy_static::lazy_static;
use regex::Regex;

const FORBIDDEN_KEYWORDS: &[&str] = &["DELETE", "DROP", "INSERT", "UPDATE"];

lazy_static! {
    static ref TABLE_REF: Regex = Regex::new(r"(?:from|join)\s+(\w+)").unwrap();
}

/// Outcome of static validation. Derived solely from the statement text and
/// the catalog allowlist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationVerdict {
    pub is_valid: bool,
}

pub struct QueryValidator {
    catalog: &'static SchemaCatalog,
}

impl QueryValidator {
    pub fn new(catalog: &'static SchemaCatalog) -> Self {
        Self { catalog }
    }

    /// Pure function of the statement text. No I/O, idempotent.
    pub fn validate(&self, sql: &str) -> ValidationVerdict {
        let upper = sql.to_uppercase();
        for keyword in FORBIDDEN_KEYWORDS {
            if upper.contains(keyword) {
                return ValidationVerdict { is_valid: false };
            }
        }

        // At most one statement separator bounds the text to one command.
        if sql.matches(';').count() > 1 {
            return ValidationVerdict { is_valid: false };
        }

        let lowered = sql.to_lowercase();
        for capture in TABLE_REF.captures_iter(&lowered) {
            if !self.catalog.is_allowed(&capture[1]) {
                return ValidationVerdict { is_valid: false };
            }
        }

        ValidationVerdict { is_valid: true }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> QueryValidator {
        QueryValidator::new(SchemaCatalog::shared())
    }

    #[test]
    fn test_forbidden_keywords_are_rejected_any_case() {
        let statements = [
            "DELETE FROM book;",
            "delete from book;",
            "DROP TABLE book;",
            "SELECT 1; INSERT INTO book VALUES (1);",
            "UPDATE book SET title = 'x';",
            "SELECT * FROM book WHERE title = 'a'; uPdAtE book SET title = 'b'",
        ];
        for sql in statements {
            assert!(!validator().validate(sql).is_valid, "{:?} should be invalid", sql);
        }
    }

    #[test]
    fn test_statement_stacking_is_rejected() {
        let sql = "SELECT title FROM book;; SELECT 1";
        assert!(!validator().validate(sql).is_valid);
    }

    #[test]
    fn test_single_trailing_separator_is_fine() {
        let sql = "SELECT title FROM book;";
        assert!(validator().validate(sql).is_valid);
    }

    #[test]
    fn test_unknown_table_is_rejected() {
        let statements = [
            "SELECT * FROM secret_table;",
            "SELECT * FROM book JOIN mysql_user ON 1 = 1;",
            "SELECT * FROM information_schema",
        ];
        for sql in statements {
            assert!(!validator().validate(sql).is_valid, "{:?} should be invalid", sql);
        }
    }

    #[test]
    fn test_allowlisted_queries_pass() {
        let statements = [
            "SELECT title, price FROM book WHERE price > 20;",
            "SELECT * FROM v_orders;",
            "select c.first_name, o.order_date from customer c join cust_order o on c.customer_id = o.customer_id;",
            "SELECT 1;",
        ];
        for sql in statements {
            assert!(validator().validate(sql).is_valid, "{:?} should be valid", sql);
        }
    }

    #[test]
    fn test_validator_is_idempotent() {
        let sql = "SELECT title FROM book;";
        let first = validator().validate(sql);
        let second = validator().validate(sql);
        assert_eq!(first, second);
        assert!(first.is_valid);
    }
}
