use tracing::{debug, trace};

use crate::domain::{
    ContextMap, QualifiedIdent, Statement, StatementContext, StatementDetails, TableRef,
    TablesClause,
};
use crate::ports::{Quoter, TokenSource};
use crate::sql_lexer::{Token, TokenKind};

use super::select;

/// Per-statement parse state shared by every grammar.
///
/// The cursor always rests on a significant token while a grammar steps.
pub(crate) struct ParserState<'a, S: TokenSource> {
    tokens: &'a mut S,
    quoter: &'a dyn Quoter,
    context: StatementContext,
    contexts: ContextMap,
    subqueries: Vec<Statement>,
    start_offset: usize,
    end_offset: usize,
}

impl<'a, S: TokenSource> ParserState<'a, S> {
    /// Rewinds the source and stops on its first significant token.
    /// `None` when the source holds nothing but whitespace and comments.
    pub fn begin(tokens: &'a mut S, quoter: &'a dyn Quoter) -> Option<Self> {
        tokens.move_start();
        let (start, end) = loop {
            if !tokens.move_next() {
                return None;
            }
            match tokens.token() {
                Some(token) if !token.is_trivia() => break (token.start, token.end),
                _ => {}
            }
        };

        let mut contexts = ContextMap::default();
        contexts.record(start, StatementContext::Start);
        Some(Self {
            tokens,
            quoter,
            context: StatementContext::Start,
            contexts,
            subqueries: Vec::new(),
            start_offset: start,
            end_offset: end,
        })
    }

    pub fn context(&self) -> StatementContext {
        self.context
    }

    pub fn end_offset(&self) -> usize {
        self.end_offset
    }

    pub fn token(&self) -> Option<&Token> {
        self.tokens.token()
    }

    pub fn is_keyword(&self, keyword: &str) -> bool {
        self.token().is_some_and(|t| t.is_keyword(keyword))
    }

    pub fn is_punctuation(&self, c: char) -> bool {
        self.token().is_some_and(|t| t.is_punctuation(c))
    }

    pub fn is_identifier(&self) -> bool {
        self.token().is_some_and(Token::is_identifier)
    }

    /// Upper-cased keyword under the cursor.
    pub fn keyword(&self) -> Option<&str> {
        match self.token().map(|t| &t.kind) {
            Some(TokenKind::Keyword(k)) => Some(k.as_str()),
            _ => None,
        }
    }

    pub fn token_start(&self) -> usize {
        self.token().map_or(self.end_offset, |t| t.start)
    }

    pub fn token_end(&self) -> usize {
        self.token().map_or(self.end_offset, |t| t.end)
    }

    pub fn unquoted(&self) -> Option<String> {
        self.token().map(|t| self.quoter.unquote(&t.text))
    }

    /// Advances to the next significant token.
    pub fn next_token(&mut self) -> bool {
        while self.tokens.move_next() {
            if let Some(token) = self.tokens.token()
                && !token.is_trivia()
            {
                self.end_offset = self.end_offset.max(token.end);
                return true;
            }
        }
        false
    }

    /// Steps back to the previous significant token.
    pub fn rewind(&mut self) -> bool {
        while self.tokens.move_previous() {
            if self.tokens.token().is_some_and(|t| !t.is_trivia()) {
                return true;
            }
        }
        false
    }

    /// Next significant token, leaving the cursor where it is.
    pub fn peek_next(&mut self) -> Option<Token> {
        let mut steps = 0;
        let mut found = None;
        while self.tokens.move_next() {
            steps += 1;
            if let Some(token) = self.tokens.token()
                && !token.is_trivia()
            {
                found = Some(token.clone());
                break;
            }
        }
        for _ in 0..steps {
            self.tokens.move_previous();
        }
        found
    }

    /// Switches context, recording the change just past the current token.
    pub fn move_to_context(&mut self, context: StatementContext) {
        let offset = self.token_end();
        trace!(from = %self.context, to = %context, offset, "context transition");
        self.context = context;
        self.contexts.record(offset, context);
    }

    fn follows_open_paren(&mut self) -> bool {
        let mut steps = 0;
        let mut found = false;
        while self.tokens.move_previous() {
            steps += 1;
            match self.tokens.token() {
                Some(token) if token.is_trivia() => {}
                Some(token) => {
                    found = token.is_punctuation('(');
                    break;
                }
                None => break,
            }
        }
        for _ in 0..steps {
            self.tokens.move_next();
        }
        found
    }

    /// True when the cursor is on a `SELECT` opening a parenthesized subquery.
    pub fn at_subquery(&mut self) -> bool {
        self.is_keyword("SELECT") && self.follows_open_paren()
    }

    /// Consumes a parenthesized subquery starting at the current `SELECT`,
    /// through its closing parenthesis, and analyzes it on its own.
    ///
    /// An unbalanced subquery runs to the end of the source.
    pub fn consume_subquery(&mut self) -> Option<Statement> {
        let start = self.token_start();
        let mut last_end = self.token_end();
        let mut depth = 1usize;

        while self.next_token() {
            if self.is_punctuation('(') {
                depth += 1;
            } else if self.is_punctuation(')') {
                depth -= 1;
                if depth == 0 {
                    break;
                }
            }
            last_end = self.token_end();
        }

        trace!(start, end = last_end, "subquery");
        let mut sub = self.tokens.sub_source(start, last_end);
        let statement = select::parse(&mut sub, self.quoter);
        if statement.is_none() {
            debug!(start, end = last_end, "subquery produced no statement, dropped");
        }
        statement
    }

    pub fn push_subquery(&mut self, statement: Statement) {
        self.subqueries.push(statement);
    }

    /// Parses a dotted name starting at the current identifier.
    ///
    /// Leaves the cursor on the last consumed part. `None` if every part
    /// unquoted to an empty string.
    pub fn parse_identifier(&mut self) -> Option<QualifiedIdent> {
        let mut parts = Vec::new();
        parts.extend(self.unquoted());

        while self.next_token() {
            if !self.is_punctuation('.') {
                self.rewind();
                break;
            }
            if !self.next_token() {
                break;
            }
            if !self.is_identifier() {
                self.rewind();
                break;
            }
            parts.extend(self.unquoted());
        }

        parts.retain(|part| !part.is_empty());
        if parts.is_empty() {
            None
        } else {
            Some(QualifiedIdent::new(parts))
        }
    }

    /// Parses an optional `[AS] alias` after a table item.
    pub fn parse_alias(&mut self) -> Option<String> {
        if !self.next_token() {
            return None;
        }
        if self.is_keyword("AS") && !self.next_token() {
            return None;
        }
        if self.is_identifier() {
            return self.unquoted().filter(|alias| !alias.is_empty());
        }
        self.rewind();
        None
    }

    pub fn parse_table_ref(&mut self) -> Option<TableRef> {
        let table = self.parse_identifier()?;
        let alias = self.parse_alias();
        Some(TableRef::new(table, alias))
    }

    pub fn finish(self, details: StatementDetails, tables: Option<TablesClause>) -> Statement {
        Statement::new(
            details,
            self.start_offset,
            self.end_offset,
            self.contexts,
            tables,
            self.subqueries,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql_lexer::SqlLexer;
    use crate::test_support::PlainQuoter;
    use crate::token_stream::TokenStream;

    fn stream(sql: &str) -> TokenStream {
        TokenStream::new(SqlLexer::new().tokenize(sql))
    }

    mod begin {
        use super::*;

        #[test]
        fn stops_on_first_significant_token() {
            let mut tokens = stream("  -- lead\n  SELECT 1");

            let state = ParserState::begin(&mut tokens, &PlainQuoter).unwrap();

            assert!(state.is_keyword("SELECT"));
            assert_eq!(state.token_start(), 12);
            assert_eq!(state.context(), StatementContext::Start);
        }

        #[test]
        fn trivia_only_source_has_no_state() {
            let mut tokens = stream("  /* nothing */ ");

            assert!(ParserState::begin(&mut tokens, &PlainQuoter).is_none());
        }
    }

    mod identifiers {
        use super::*;

        #[test]
        fn dotted_name_is_collected_and_cursor_rests_on_last_part() {
            let mut tokens = stream("public . \"Users\" u");
            let mut state = ParserState::begin(&mut tokens, &PlainQuoter).unwrap();

            let ident = state.parse_identifier().unwrap();

            assert_eq!(ident.parts(), &["public", "Users"]);
            assert_eq!(state.token().unwrap().text, "\"Users\"");
        }

        #[test]
        fn dot_followed_by_non_identifier_rewinds_to_dot() {
            let mut tokens = stream("t.* FROM");
            let mut state = ParserState::begin(&mut tokens, &PlainQuoter).unwrap();

            let ident = state.parse_identifier().unwrap();

            assert_eq!(ident.parts(), &["t"]);
            assert!(state.is_punctuation('.'));
        }

        #[test]
        fn empty_quoted_parts_are_dropped() {
            let mut tokens = stream("\"\"");
            let mut state = ParserState::begin(&mut tokens, &PlainQuoter).unwrap();

            assert_eq!(state.parse_identifier(), None);
        }

        #[test]
        fn alias_after_as_is_parsed() {
            let mut tokens = stream("orders AS o WHERE");
            let mut state = ParserState::begin(&mut tokens, &PlainQuoter).unwrap();

            let table_ref = state.parse_table_ref().unwrap();

            assert_eq!(table_ref.alias(), Some("o"));
            assert!(state.next_token());
            assert!(state.is_keyword("WHERE"));
        }

        #[test]
        fn keyword_after_table_is_not_an_alias() {
            let mut tokens = stream("orders WHERE");
            let mut state = ParserState::begin(&mut tokens, &PlainQuoter).unwrap();

            let table_ref = state.parse_table_ref().unwrap();

            assert_eq!(table_ref.alias(), None);
            assert_eq!(state.token().unwrap().text, "orders");
        }

        #[test]
        fn empty_alias_is_absent() {
            let mut tokens = stream("orders \"\"");
            let mut state = ParserState::begin(&mut tokens, &PlainQuoter).unwrap();

            let table_ref = state.parse_table_ref().unwrap();

            assert_eq!(table_ref.alias(), None);
        }
    }

    mod peeking {
        use super::*;

        #[test]
        fn peek_skips_trivia_and_keeps_cursor() {
            let mut tokens = stream("END /* c */ IF;");
            let mut state = ParserState::begin(&mut tokens, &PlainQuoter).unwrap();

            let next = state.peek_next().unwrap();

            assert_eq!(next.text, "IF");
            assert!(state.is_keyword("END"));
            assert!(state.next_token());
            assert!(state.is_keyword("IF"));
        }

        #[test]
        fn peek_at_last_token_is_none() {
            let mut tokens = stream("END");
            let mut state = ParserState::begin(&mut tokens, &PlainQuoter).unwrap();

            assert_eq!(state.peek_next(), None);
            assert!(state.is_keyword("END"));
        }
    }

    mod contexts {
        use super::*;

        #[test]
        fn transition_is_recorded_after_current_token() {
            let mut tokens = stream("SELECT a");
            let mut state = ParserState::begin(&mut tokens, &PlainQuoter).unwrap();

            state.move_to_context(StatementContext::Select);
            let statement = state.finish(
                StatementDetails::Select {
                    select_values: Vec::new(),
                },
                None,
            );

            assert_eq!(statement.context_at_offset(5), Some(StatementContext::Start));
            assert_eq!(statement.context_at_offset(6), Some(StatementContext::Select));
        }
    }

    mod subqueries {
        use super::*;

        #[test]
        fn select_after_paren_is_a_subquery() {
            let mut tokens = stream("x IN (SELECT a FROM t) AND");
            let mut state = ParserState::begin(&mut tokens, &PlainQuoter).unwrap();
            while !state.is_keyword("SELECT") {
                state.next_token();
            }

            assert!(state.at_subquery());
            let sub = state.consume_subquery().unwrap();

            assert_eq!(sub.start_offset(), 6);
            assert_eq!(sub.end_offset(), 21);
            assert!(state.is_punctuation(')'));
        }

        #[test]
        fn bare_select_is_not_a_subquery() {
            let mut tokens = stream("AS SELECT a");
            let mut state = ParserState::begin(&mut tokens, &PlainQuoter).unwrap();
            state.next_token();

            assert!(!state.at_subquery());
            assert!(state.is_keyword("SELECT"));
        }

        #[test]
        fn unbalanced_subquery_runs_to_end() {
            let mut tokens = stream("(SELECT a FROM (t");
            let mut state = ParserState::begin(&mut tokens, &PlainQuoter).unwrap();
            state.next_token();

            let sub = state.consume_subquery().unwrap();

            assert_eq!(sub.end_offset(), 17);
            assert!(!state.next_token());
        }
    }
}
