//! Single-pass statement analysis over a token source.
//!
//! The dispatcher picks a grammar from the first significant keyword; each
//! grammar drives a [`ParserState`] through its contexts. Parenthesized
//! `SELECT`s are pulled out and analyzed recursively as subqueries.

mod clauses;
pub mod create;
pub mod delete;
pub mod drop;
pub mod insert;
pub mod select;
mod state;
pub mod update;

use tracing::debug;

use crate::domain::{Statement, StatementContext, StatementKind};
use crate::ports::{Quoter, TokenSource};
use crate::sql_lexer::{SqlLexer, TokenKind};
use crate::token_stream::TokenStream;

pub(crate) use state::ParserState;

/// One statement kind's state machine, stepped once per significant token.
pub(crate) trait Grammar {
    /// Whether a parenthesized `SELECT` in `context` is taken as a subquery.
    fn intercepts(&self, _context: StatementContext) -> bool {
        true
    }

    fn step<S: TokenSource>(&mut self, state: &mut ParserState<'_, S>);

    /// Runs after a subquery, closing parenthesis included, was consumed.
    fn after_subquery<S: TokenSource>(&mut self, _state: &mut ParserState<'_, S>) {}

    fn finish<S: TokenSource>(self, state: ParserState<'_, S>) -> Statement;
}

pub(crate) fn run<S, G>(tokens: &mut S, quoter: &dyn Quoter, mut grammar: G) -> Option<Statement>
where
    S: TokenSource,
    G: Grammar,
{
    let mut state = ParserState::begin(tokens, quoter)?;
    loop {
        if grammar.intercepts(state.context()) && state.at_subquery() {
            if let Some(subquery) = state.consume_subquery() {
                state.push_subquery(subquery);
            }
            grammar.after_subquery(&mut state);
        } else {
            grammar.step(&mut state);
        }
        if !state.next_token() {
            break;
        }
    }

    let statement = grammar.finish(state);
    debug!(
        kind = %statement.kind(),
        start = statement.start_offset(),
        end = statement.end_offset(),
        subqueries = statement.subqueries().len(),
        "statement analyzed"
    );
    Some(statement)
}

/// Finds the kind of statement in `tokens` from its first significant keyword.
///
/// `DECLARE` and `SET` prefixes are skipped up to the first `SELECT` outside
/// parentheses. `None` when no statement keyword leads the source.
pub fn analyze_kind<S: TokenSource>(tokens: &mut S) -> Option<StatementKind> {
    tokens.move_start();
    let first = loop {
        if !tokens.move_next() {
            return None;
        }
        match tokens.token() {
            Some(token) if !token.is_trivia() => break token.clone(),
            _ => {}
        }
    };

    if first.is_keyword("DECLARE") || first.is_keyword("SET") {
        let mut depth = 0usize;
        while tokens.move_next() {
            let Some(token) = tokens.token() else { break };
            if token.is_punctuation('(') {
                depth += 1;
            } else if token.is_punctuation(')') {
                depth = depth.saturating_sub(1);
            } else if depth == 0 && token.is_keyword("SELECT") {
                return Some(StatementKind::Select);
            }
        }
        return None;
    }

    match &first.kind {
        TokenKind::Keyword(keyword) => StatementKind::from_keyword(keyword),
        _ => None,
    }
}

/// Analyzes `tokens` with the grammar for `kind`.
pub fn analyze_as<S: TokenSource>(
    tokens: &mut S,
    quoter: &dyn Quoter,
    kind: StatementKind,
) -> Option<Statement> {
    match kind {
        StatementKind::Select => select::parse(tokens, quoter),
        StatementKind::Insert => insert::parse(tokens, quoter),
        StatementKind::Update => update::parse(tokens, quoter),
        StatementKind::Delete => delete::parse(tokens, quoter),
        StatementKind::Drop => drop::parse(tokens, quoter),
        StatementKind::Create => create::parse(tokens, quoter),
    }
}

pub fn analyze<S: TokenSource>(tokens: &mut S, quoter: &dyn Quoter) -> Option<Statement> {
    let Some(kind) = analyze_kind(tokens) else {
        debug!("no statement kind recognized");
        return None;
    };
    debug!(%kind, "statement kind detected");
    analyze_as(tokens, quoter, kind)
}

/// Lexes and analyzes SQL text with a fixed lexer and quoter.
pub struct SqlAnalyzer {
    lexer: SqlLexer,
    quoter: Box<dyn Quoter>,
}

impl SqlAnalyzer {
    pub fn new(lexer: SqlLexer, quoter: Box<dyn Quoter>) -> Self {
        Self { lexer, quoter }
    }

    pub fn lexer(&self) -> &SqlLexer {
        &self.lexer
    }

    /// Analyzes `sql` as a single statement.
    pub fn analyze_sql(&self, sql: &str) -> Option<Statement> {
        let mut tokens = TokenStream::new(self.lexer.tokenize(sql));
        analyze(&mut tokens, self.quoter.as_ref())
    }

    /// Analyzes every `;`-separated statement, skipping unrecognized ones.
    pub fn analyze_all(&self, sql: &str) -> Vec<Statement> {
        let tokens = self.lexer.tokenize(sql);
        let spans = self.lexer.statement_spans(&tokens);
        let stream = TokenStream::new(tokens);
        spans
            .into_iter()
            .filter_map(|(start, end)| {
                let mut sub = stream.sub_source(start, end);
                analyze(&mut sub, self.quoter.as_ref())
            })
            .collect()
    }

    /// Analyzes the statement whose span covers `offset`, end included.
    pub fn analyze_at(&self, sql: &str, offset: usize) -> Option<Statement> {
        let tokens = self.lexer.tokenize(sql);
        let (start, end) = self
            .lexer
            .statement_spans(&tokens)
            .into_iter()
            .find(|&(start, end)| start <= offset && offset <= end)?;
        let mut sub = TokenStream::new(tokens).sub_source(start, end);
        analyze(&mut sub, self.quoter.as_ref())
    }
}
