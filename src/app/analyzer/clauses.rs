use crate::domain::{StatementContext, TableRef, TablesClause};
use crate::ports::TokenSource;

use super::state::ParserState;

/// Context a trailing-clause keyword leads to from `current`.
///
/// Only forward moves are returned; `BY` completes `GROUP` and `ORDER`.
pub(super) fn trailing_clause(
    current: StatementContext,
    keyword: &str,
) -> Option<StatementContext> {
    let next = match keyword {
        "WHERE" => StatementContext::Where,
        "GROUP" => StatementContext::Group,
        "HAVING" => StatementContext::Having,
        "ORDER" => StatementContext::Order,
        "BY" => match current {
            StatementContext::Group => StatementContext::GroupBy,
            StatementContext::Order => StatementContext::OrderBy,
            _ => return None,
        },
        _ => return None,
    };
    (next > current).then_some(next)
}

/// Moves to the trailing clause named by the current keyword, if any.
pub(super) fn advance_trailing<S: TokenSource>(state: &mut ParserState<'_, S>) -> bool {
    let next = state
        .keyword()
        .and_then(|keyword| trailing_clause(state.context(), keyword));
    match next {
        Some(context) => {
            state.move_to_context(context);
            true
        }
        None => false,
    }
}

/// Comma- and JOIN-separated table items, with `ON` join conditions.
///
/// `list_context` is the context table items are read in (`FROM`,
/// `UPDATE` or `DELETE`); `ON` leaves it for `JOIN_CONDITION` and a
/// comma or `JOIN` at paren depth zero comes back.
#[derive(Debug, Default)]
pub(super) struct TableList {
    refs: Vec<TableRef>,
    derived_aliases: Vec<String>,
    expecting_table: bool,
    depth: usize,
}

impl TableList {
    pub fn expect_table(&mut self) {
        self.expecting_table = true;
    }

    /// Handles the current token; false if it is not part of the list.
    pub fn step<S: TokenSource>(
        &mut self,
        state: &mut ParserState<'_, S>,
        list_context: StatementContext,
    ) -> bool {
        if state.is_punctuation('(') {
            self.depth += 1;
            return true;
        }
        if state.is_punctuation(')') {
            self.depth = self.depth.saturating_sub(1);
            return true;
        }
        if self.depth > 0 {
            return true;
        }

        if state.is_punctuation(',') || state.is_keyword("JOIN") {
            if state.context() == StatementContext::JoinCondition {
                state.move_to_context(list_context);
            }
            self.expecting_table = true;
            return true;
        }
        if state.is_keyword("ON") && state.context() == list_context {
            state.move_to_context(StatementContext::JoinCondition);
            self.expecting_table = false;
            return true;
        }
        if state.is_identifier() && state.context() == list_context {
            if self.expecting_table {
                self.refs.extend(state.parse_table_ref());
                self.expecting_table = false;
            }
            return true;
        }
        false
    }

    /// Called after a parenthesized subquery, closing paren included, was
    /// consumed in a list position. A derived-table alias may follow.
    pub fn after_subquery<S: TokenSource>(
        &mut self,
        state: &mut ParserState<'_, S>,
        list_context: StatementContext,
    ) {
        self.depth = self.depth.saturating_sub(1);
        if self.depth == 0 && self.expecting_table && state.context() == list_context {
            self.derived_aliases.extend(state.parse_alias());
            self.expecting_table = false;
        }
    }

    pub fn tables_clause(&self) -> TablesClause {
        TablesClause::from_table_refs(&self.refs).with_derived_aliases(self.derived_aliases.clone())
    }
}
