use crate::domain::{
    QualifiedIdent, Statement, StatementContext, StatementDetails, TableRef, TablesClause,
};
use crate::ports::{Quoter, TokenSource};

use super::{Grammar, ParserState, run};

#[derive(Debug, Default)]
struct InsertGrammar {
    table: Option<QualifiedIdent>,
    columns: Vec<String>,
    columns_closed: bool,
    values: Vec<String>,
}

impl Grammar for InsertGrammar {
    fn step<S: TokenSource>(&mut self, state: &mut ParserState<'_, S>) {
        match state.context() {
            StatementContext::Start => {
                if state.is_keyword("INSERT") {
                    state.move_to_context(StatementContext::Insert);
                }
            }
            StatementContext::Insert => {
                if state.is_keyword("INTO") {
                    state.move_to_context(StatementContext::InsertInto);
                }
            }
            StatementContext::InsertInto => {
                if state.is_identifier() && self.table.is_none() {
                    self.table = state.parse_identifier();
                } else if state.is_punctuation('(') {
                    state.move_to_context(StatementContext::Columns);
                } else if state.is_keyword("VALUES") {
                    state.move_to_context(StatementContext::Values);
                } else if state.is_keyword("SET") {
                    state.move_to_context(StatementContext::Set);
                }
            }
            StatementContext::Columns => {
                if state.is_keyword("VALUES") {
                    state.move_to_context(StatementContext::Values);
                } else if state.is_punctuation(')') {
                    self.columns_closed = true;
                } else if state.is_identifier() && !self.columns_closed {
                    self.columns.extend(state.unquoted());
                }
            }
            StatementContext::Values => {
                // literals are not captured, only identifier tokens
                if state.is_identifier() {
                    self.values.extend(state.unquoted());
                }
            }
            _ => {}
        }
    }

    fn finish<S: TokenSource>(self, state: ParserState<'_, S>) -> Statement {
        let tables = self
            .table
            .as_ref()
            .map(|table| TablesClause::from_table_refs(&[TableRef::new(table.clone(), None)]));
        state.finish(
            StatementDetails::Insert {
                table: self.table,
                columns: self.columns,
                values: self.values,
            },
            tables,
        )
    }
}

pub fn parse<S: TokenSource>(tokens: &mut S, quoter: &dyn Quoter) -> Option<Statement> {
    run(tokens, quoter, InsertGrammar::default())
}
