use crate::domain::{Statement, StatementContext, StatementDetails};
use crate::ports::{Quoter, TokenSource};

use super::clauses::{TableList, advance_trailing};
use super::{Grammar, ParserState, run};

/// `DELETE [a, b] FROM t ...`; tables named before FROM belong to the same
/// list as the FROM items.
#[derive(Debug, Default)]
struct DeleteGrammar {
    tables: TableList,
}

impl Grammar for DeleteGrammar {
    fn step<S: TokenSource>(&mut self, state: &mut ParserState<'_, S>) {
        match state.context() {
            StatementContext::Start => {
                if state.is_keyword("DELETE") {
                    state.move_to_context(StatementContext::Delete);
                    self.tables.expect_table();
                }
            }
            StatementContext::Delete => {
                if state.is_keyword("FROM") {
                    state.move_to_context(StatementContext::From);
                    self.tables.expect_table();
                } else if !self.tables.step(state, StatementContext::Delete) {
                    advance_trailing(state);
                }
            }
            StatementContext::From | StatementContext::JoinCondition => {
                if !self.tables.step(state, StatementContext::From) {
                    advance_trailing(state);
                }
            }
            _ => {
                advance_trailing(state);
            }
        }
    }

    fn after_subquery<S: TokenSource>(&mut self, state: &mut ParserState<'_, S>) {
        if matches!(
            state.context(),
            StatementContext::From | StatementContext::JoinCondition
        ) {
            self.tables.after_subquery(state, StatementContext::From);
        }
    }

    fn finish<S: TokenSource>(self, state: ParserState<'_, S>) -> Statement {
        let tables = state
            .context()
            .is_after(StatementContext::From)
            .then(|| self.tables.tables_clause());
        state.finish(StatementDetails::Delete, tables)
    }
}

pub fn parse<S: TokenSource>(tokens: &mut S, quoter: &dyn Quoter) -> Option<Statement> {
    run(tokens, quoter, DeleteGrammar::default())
}
