use crate::app::SqlAnalyzer;
use crate::app::ports::Quoter;
use crate::app::sql_lexer::SqlLexer;
use crate::domain::Dialect;

/// Strips the identifier quotes of one SQL dialect.
///
/// Doubled closing quotes inside the name collapse to one. An opening quote
/// without its closer is still stripped. Unquoted names pass through with
/// their case intact.
#[derive(Debug, Clone, Copy, Default)]
pub struct DialectQuoter {
    dialect: Dialect,
}

impl DialectQuoter {
    pub fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }
}

impl Quoter for DialectQuoter {
    fn unquote(&self, raw: &str) -> String {
        let Some(open) = raw.chars().next() else {
            return String::new();
        };
        let Some(close) = self.dialect.closing_quote(open) else {
            return raw.to_string();
        };

        let rest = &raw[open.len_utf8()..];
        let inner = rest.strip_suffix(close).unwrap_or(rest);
        let doubled: String = [close, close].iter().collect();
        inner.replace(&doubled, &close.to_string())
    }
}

/// Analyzer whose lexer and quoter both follow `dialect`.
pub fn dialect_analyzer(dialect: Dialect) -> SqlAnalyzer {
    SqlAnalyzer::new(
        SqlLexer::with_dialect(dialect),
        Box::new(DialectQuoter::new(dialect)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    mod unquote {
        use super::*;

        #[rstest]
        #[case(Dialect::Ansi, "plain", "plain")]
        #[case(Dialect::Ansi, "MixedCase", "MixedCase")]
        #[case(Dialect::Ansi, "\"My Table\"", "My Table")]
        #[case(Dialect::Ansi, "\"a\"\"b\"", "a\"b")]
        #[case(Dialect::Ansi, "\"open", "open")]
        #[case(Dialect::Ansi, "\"\"", "")]
        #[case(Dialect::Ansi, "`tick`", "`tick`")]
        #[case(Dialect::MySql, "`tick`", "tick")]
        #[case(Dialect::MySql, "`a``b`", "a`b")]
        #[case(Dialect::SqlServer, "[first name]", "first name")]
        #[case(Dialect::SqlServer, "[a]]b]", "a]b")]
        #[case(Dialect::Postgres, "\"ü\"", "ü")]
        fn strips_dialect_quotes(
            #[case] dialect: Dialect,
            #[case] raw: &str,
            #[case] expected: &str,
        ) {
            let quoter = DialectQuoter::new(dialect);

            assert_eq!(quoter.unquote(raw), expected);
        }

        #[test]
        fn empty_lexeme_stays_empty() {
            assert_eq!(DialectQuoter::default().unquote(""), "");
        }
    }

    mod analyzer {
        use super::*;
        use crate::domain::QualifiedIdent;

        #[test]
        fn sqlserver_brackets_name_tables() {
            let analyzer = dialect_analyzer(Dialect::SqlServer);

            let statement = analyzer
                .analyze_sql("SELECT * FROM [dbo].[Order Lines] ol")
                .unwrap();

            assert_eq!(
                statement.tables_clause().unwrap().table_for_alias("ol"),
                Some(&QualifiedIdent::new(["dbo", "Order Lines"]))
            );
        }

        #[test]
        fn mysql_backticks_name_dropped_table() {
            let analyzer = dialect_analyzer(Dialect::MySql);

            let statement = analyzer.analyze_sql("DROP TABLE `order`").unwrap();

            assert_eq!(statement.dropped_table().unwrap().to_string(), "order");
        }
    }
}
