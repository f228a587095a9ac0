use std::mem;

use crate::domain::{Statement, StatementContext, StatementDetails, TablesClause};
use crate::ports::{Quoter, TokenSource};

use super::clauses::{TableList, advance_trailing};
use super::{Grammar, ParserState, run};

/// SELECT clauses: projection, FROM items with joins, and the trailing
/// WHERE / GROUP BY / HAVING / ORDER BY keywords.
///
/// Also embedded by the CREATE grammar for `CREATE VIEW ... AS SELECT`.
#[derive(Debug, Default)]
pub(crate) struct SelectGrammar {
    select_values: Vec<Vec<String>>,
    current_value: Vec<String>,
    after_dot: bool,
    projection_depth: usize,
    start_depth: usize,
    tables: TableList,
}

impl SelectGrammar {
    fn commit_value(&mut self) {
        if !self.current_value.is_empty() {
            self.select_values.push(mem::take(&mut self.current_value));
        }
        self.after_dot = false;
    }

    fn step_projection<S: TokenSource>(&mut self, state: &mut ParserState<'_, S>) {
        if state.is_punctuation('(') {
            self.projection_depth += 1;
            if self.projection_depth == 1 {
                // function call or expression; its arguments are not modeled
                self.current_value.clear();
            }
            return;
        }
        if state.is_punctuation(')') {
            self.projection_depth = self.projection_depth.saturating_sub(1);
            return;
        }
        if self.projection_depth > 0 {
            return;
        }

        if state.is_punctuation(',') {
            self.commit_value();
        } else if state.is_punctuation('.') {
            self.after_dot = true;
        } else if state.is_keyword("AS") {
            self.current_value.clear();
            self.after_dot = false;
        } else if state.is_keyword("FROM") {
            self.commit_value();
            state.move_to_context(StatementContext::From);
            self.tables.expect_table();
        } else if state.is_keyword("ON") {
            self.commit_value();
            state.move_to_context(StatementContext::JoinCondition);
        } else if state.is_identifier() {
            if !self.after_dot {
                self.current_value.clear();
            }
            self.current_value.extend(state.unquoted());
            self.after_dot = false;
        } else {
            if advance_trailing(state) {
                self.commit_value();
            }
            self.after_dot = false;
        }
    }

    /// Select values and, once FROM was reached, the tables clause.
    pub fn into_parts(
        mut self,
        context: StatementContext,
    ) -> (Vec<Vec<String>>, Option<TablesClause>) {
        self.commit_value();
        let tables = (context.is_select_clause() && context.is_after(StatementContext::From))
            .then(|| self.tables.tables_clause());
        (self.select_values, tables)
    }
}

impl Grammar for SelectGrammar {
    fn intercepts(&self, context: StatementContext) -> bool {
        context.is_after(StatementContext::Select)
    }

    fn step<S: TokenSource>(&mut self, state: &mut ParserState<'_, S>) {
        match state.context() {
            StatementContext::Start => {
                if state.is_punctuation('(') {
                    self.start_depth += 1;
                } else if state.is_punctuation(')') {
                    self.start_depth = self.start_depth.saturating_sub(1);
                } else if self.start_depth == 0 && state.is_keyword("SELECT") {
                    state.move_to_context(StatementContext::Select);
                }
            }
            StatementContext::Select => self.step_projection(state),
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
        match state.context() {
            StatementContext::Select => {
                self.projection_depth = self.projection_depth.saturating_sub(1);
            }
            StatementContext::From | StatementContext::JoinCondition => {
                self.tables.after_subquery(state, StatementContext::From);
            }
            _ => {}
        }
    }

    fn finish<S: TokenSource>(self, state: ParserState<'_, S>) -> Statement {
        let (select_values, tables) = self.into_parts(state.context());
        state.finish(StatementDetails::Select { select_values }, tables)
    }
}

pub fn parse<S: TokenSource>(tokens: &mut S, quoter: &dyn Quoter) -> Option<Statement> {
    run(tokens, quoter, SelectGrammar::default())
}
