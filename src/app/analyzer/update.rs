use crate::domain::{Statement, StatementContext, StatementDetails};
use crate::ports::{Quoter, TokenSource};

use super::clauses::{TableList, advance_trailing};
use super::{Grammar, ParserState, run};

#[derive(Debug, Default)]
struct UpdateGrammar {
    tables: TableList,
    seen_update: bool,
}

impl Grammar for UpdateGrammar {
    fn step<S: TokenSource>(&mut self, state: &mut ParserState<'_, S>) {
        match state.context() {
            StatementContext::Start => {
                if state.is_keyword("UPDATE") {
                    state.move_to_context(StatementContext::Update);
                    self.seen_update = true;
                    self.tables.expect_table();
                }
            }
            StatementContext::Update | StatementContext::JoinCondition => {
                if self.tables.step(state, StatementContext::Update) {
                    return;
                }
                if state.is_keyword("SET") {
                    state.move_to_context(StatementContext::Set);
                }
            }
            // SET (610) sits after WHERE (530), so the move is explicit
            StatementContext::Set => {
                if state.is_keyword("WHERE") {
                    state.move_to_context(StatementContext::Where);
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
            StatementContext::Update | StatementContext::JoinCondition
        ) {
            self.tables.after_subquery(state, StatementContext::Update);
        }
    }

    fn finish<S: TokenSource>(self, state: ParserState<'_, S>) -> Statement {
        let tables = self.seen_update.then(|| self.tables.tables_clause());
        state.finish(StatementDetails::Update, tables)
    }
}

pub fn parse<S: TokenSource>(tokens: &mut S, quoter: &dyn Quoter) -> Option<Statement> {
    run(tokens, quoter, UpdateGrammar::default())
}
