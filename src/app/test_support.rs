//! Helpers shared by unit tests and, through the `test-support` feature,
//! by downstream integration tests.

use crate::analyzer::SqlAnalyzer;
use crate::domain::Statement;
use crate::ports::Quoter;
use crate::sql_lexer::SqlLexer;

/// Strips ANSI double quotes and collapses doubled ones.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainQuoter;

impl Quoter for PlainQuoter {
    fn unquote(&self, raw: &str) -> String {
        match raw.strip_prefix('"') {
            Some(rest) => rest.strip_suffix('"').unwrap_or(rest).replace("\"\"", "\""),
            None => raw.to_string(),
        }
    }
}

pub fn plain_analyzer() -> SqlAnalyzer {
    SqlAnalyzer::new(SqlLexer::new(), Box::new(PlainQuoter))
}

pub fn analyze_sql(sql: &str) -> Option<Statement> {
    plain_analyzer().analyze_sql(sql)
}

/// Character offset of the first occurrence of `needle` in `sql`.
pub fn offset_of(sql: &str, needle: &str) -> usize {
    let byte_offset = sql
        .find(needle)
        .unwrap_or_else(|| panic!("{needle:?} not found in {sql:?}"));
    sql[..byte_offset].chars().count()
}
