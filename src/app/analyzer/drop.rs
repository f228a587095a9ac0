use crate::domain::{QualifiedIdent, Statement, StatementContext, StatementDetails};
use crate::ports::{Quoter, TokenSource};

use super::{Grammar, ParserState, run};

#[derive(Debug, Default)]
struct DropGrammar {
    table: Option<QualifiedIdent>,
}

impl Grammar for DropGrammar {
    fn step<S: TokenSource>(&mut self, state: &mut ParserState<'_, S>) {
        match state.context() {
            StatementContext::Start => {
                if state.is_keyword("DROP") {
                    state.move_to_context(StatementContext::Drop);
                }
            }
            StatementContext::Drop => {
                if state.is_keyword("TABLE") {
                    state.move_to_context(StatementContext::DropTable);
                }
            }
            StatementContext::DropTable => {
                // IF EXISTS is passed over since both are keywords
                if state.is_identifier() && self.table.is_none() {
                    self.table = state.parse_identifier();
                }
            }
            _ => {}
        }
    }

    fn finish<S: TokenSource>(self, state: ParserState<'_, S>) -> Statement {
        state.finish(StatementDetails::Drop { table: self.table }, None)
    }
}

pub fn parse<S: TokenSource>(tokens: &mut S, quoter: &dyn Quoter) -> Option<Statement> {
    run(tokens, quoter, DropGrammar::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::analyze_sql;
    use rstest::rstest;

    #[rstest]
    #[case("DROP TABLE \"My Table\"", &["My Table"])]
    #[case("DROP TABLE IF EXISTS s.t", &["s", "t"])]
    #[case("drop table t, u", &["t"])]
    fn dropped_table_is_captured(#[case] sql: &str, #[case] expected: &[&str]) {
        let statement = analyze_sql(sql).unwrap();

        let table = statement.dropped_table().unwrap();

        assert_eq!(table.parts(), expected);
        assert!(statement.tables_clause().is_none());
    }

    #[test]
    fn drop_of_other_objects_has_no_table() {
        let statement = analyze_sql("DROP VIEW v").unwrap();

        assert_eq!(statement.dropped_table(), None);
        assert_eq!(statement.context_at_offset(11), Some(StatementContext::Drop));
    }
}
