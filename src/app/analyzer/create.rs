use crate::domain::{Statement, StatementContext, StatementDetails};
use crate::ports::{Quoter, TokenSource};
use crate::sql_lexer::ends_control_flow;

use super::select::SelectGrammar;
use super::{Grammar, ParserState, run};

/// CREATE variants. Routines track their `BEGIN ... END` body; views hand
/// the defining query to an embedded SELECT grammar.
#[derive(Debug, Default)]
struct CreateGrammar {
    body_start: usize,
    body_end: usize,
    /// BEGIN and CASE blocks opened inside the body.
    block_depth: usize,
    view_query: SelectGrammar,
}

impl Grammar for CreateGrammar {
    fn step<S: TokenSource>(&mut self, state: &mut ParserState<'_, S>) {
        let context = state.context();
        if context.is_select_clause() {
            self.view_query.step(state);
            return;
        }

        match context {
            StatementContext::Start => {
                if state.is_keyword("CREATE") {
                    state.move_to_context(StatementContext::Create);
                }
            }
            StatementContext::Create => {
                let next = match state.keyword() {
                    Some("PROCEDURE") => Some(StatementContext::CreateProcedure),
                    Some("FUNCTION") => Some(StatementContext::CreateFunction),
                    Some("TABLE") => Some(StatementContext::CreateTable),
                    Some("TEMPORARY") => Some(StatementContext::CreateTemporaryTable),
                    Some("DATABASE") => Some(StatementContext::CreateDatabase),
                    Some("SCHEMA") => Some(StatementContext::CreateSchema),
                    Some("VIEW") => Some(StatementContext::CreateView),
                    _ => None,
                };
                if let Some(next) = next {
                    if matches!(
                        next,
                        StatementContext::CreateProcedure | StatementContext::CreateFunction
                    ) {
                        self.body_start = state.token_end();
                    }
                    state.move_to_context(next);
                }
            }
            StatementContext::CreateTemporaryTable => {
                if state.is_keyword("TABLE") {
                    state.move_to_context(StatementContext::CreateTable);
                }
            }
            StatementContext::CreateProcedure | StatementContext::CreateFunction => {
                if state.is_keyword("BEGIN") {
                    self.body_start = state.token_end();
                    state.move_to_context(StatementContext::Begin);
                }
            }
            StatementContext::Begin => {
                if state.is_keyword("BEGIN") || state.is_keyword("CASE") {
                    self.block_depth += 1;
                } else if state.is_keyword("END")
                    && !ends_control_flow(state.peek_next().as_ref())
                {
                    if self.block_depth == 0 {
                        self.body_end = state.token_start();
                        state.move_to_context(StatementContext::End);
                    } else {
                        self.block_depth -= 1;
                    }
                }
            }
            StatementContext::CreateView => {
                if state.is_keyword("AS") {
                    state.move_to_context(StatementContext::CreateViewAs);
                }
            }
            StatementContext::CreateViewAs => {
                if state.is_keyword("SELECT") {
                    state.move_to_context(StatementContext::Select);
                }
            }
            _ => {}
        }
    }

    fn after_subquery<S: TokenSource>(&mut self, state: &mut ParserState<'_, S>) {
        if state.context().is_select_clause() {
            self.view_query.after_subquery(state);
        }
    }

    fn finish<S: TokenSource>(self, state: ParserState<'_, S>) -> Statement {
        let context = state.context();
        // an unterminated body runs to the last token
        let body_end = if context == StatementContext::Begin {
            state.end_offset()
        } else {
            self.body_end
        };
        let (_, tables) = self.view_query.into_parts(context);
        state.finish(
            StatementDetails::Create {
                body_start: self.body_start,
                body_end,
            },
            tables,
        )
    }
}

pub fn parse<S: TokenSource>(tokens: &mut S, quoter: &dyn Quoter) -> Option<Statement> {
    run(tokens, quoter, CreateGrammar::default())
}
