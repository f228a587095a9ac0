use std::ops::Range;
use std::sync::Arc;

use crate::ports::TokenSource;
use crate::sql_lexer::Token;

/// Token source over a shared, lexed token list.
///
/// Sub-sources share the same list and only narrow the index range, so
/// extracting a subquery does not copy tokens.
#[derive(Debug, Clone)]
pub struct TokenStream {
    tokens: Arc<[Token]>,
    range: Range<usize>,
    cursor: Option<usize>,
}

impl TokenStream {
    pub fn new(tokens: Vec<Token>) -> Self {
        let len = tokens.len();
        Self {
            tokens: tokens.into(),
            range: 0..len,
            cursor: None,
        }
    }

    fn visible(&self) -> &[Token] {
        &self.tokens[self.range.clone()]
    }
}

impl TokenSource for TokenStream {
    fn move_start(&mut self) {
        self.cursor = None;
    }

    fn move_next(&mut self) -> bool {
        let next = self.cursor.map_or(self.range.start, |c| c + 1);
        if next < self.range.end {
            self.cursor = Some(next);
            true
        } else {
            false
        }
    }

    fn move_previous(&mut self) -> bool {
        match self.cursor {
            Some(c) if c > self.range.start => {
                self.cursor = Some(c - 1);
                true
            }
            _ => false,
        }
    }

    fn token(&self) -> Option<&Token> {
        self.cursor.and_then(|c| self.tokens.get(c))
    }

    fn sub_source(&self, start: usize, end: usize) -> Self {
        let visible = self.visible();
        let lo = self.range.start + visible.partition_point(|t| t.start < start);
        let hi = self.range.start + visible.partition_point(|t| t.end <= end);
        Self {
            tokens: Arc::clone(&self.tokens),
            range: lo..hi.max(lo),
            cursor: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql_lexer::SqlLexer;

    fn stream(sql: &str) -> TokenStream {
        TokenStream::new(SqlLexer::new().tokenize(sql))
    }

    fn texts(source: &mut TokenStream) -> Vec<String> {
        source.move_start();
        let mut out = Vec::new();
        while source.move_next() {
            if let Some(token) = source.token() {
                out.push(token.text.clone());
            }
        }
        out
    }

    mod cursor {
        use super::*;

        #[test]
        fn fresh_stream_has_no_current_token() {
            let s = stream("SELECT 1");

            assert!(s.token().is_none());
        }

        #[test]
        fn move_next_fails_at_end_without_moving() {
            let mut s = stream("a b");
            while s.move_next() {}

            assert_eq!(s.token().unwrap().text, "b");
            assert!(!s.move_next());
            assert_eq!(s.token().unwrap().text, "b");
        }

        #[test]
        fn move_previous_stops_at_first_token() {
            let mut s = stream("a b");
            s.move_next();
            s.move_next();

            assert!(s.move_previous());
            assert_eq!(s.token().unwrap().text, "a");
            assert!(!s.move_previous());
        }

        #[test]
        fn move_start_rewinds() {
            let mut s = stream("a b");
            s.move_next();
            s.move_next();

            s.move_start();

            assert!(s.move_next());
            assert_eq!(s.token().unwrap().text, "a");
        }
    }

    mod sub_source {
        use super::*;

        #[test]
        fn keeps_tokens_inside_span_with_original_offsets() {
            let s = stream("SELECT (SELECT x FROM t) FROM u");

            let mut sub = s.sub_source(8, 23);

            assert_eq!(texts(&mut sub), vec!["SELECT", " ", "x", " ", "FROM", " ", "t"]);
            sub.move_start();
            sub.move_next();
            assert_eq!(sub.token().unwrap().start, 8);
        }

        #[test]
        fn nested_sub_source_stays_within_parent() {
            let s = stream("a b c d");
            let outer = s.sub_source(2, 5);

            let mut inner = outer.sub_source(0, 100);

            assert_eq!(texts(&mut inner), vec!["b", " ", "c"]);
        }

        #[test]
        fn empty_span_yields_empty_source() {
            let s = stream("a b");

            let mut sub = s.sub_source(1, 1);

            assert!(!sub.move_next());
            assert!(sub.token().is_none());
        }

        #[test]
        fn cursor_is_independent_of_parent() {
            let mut s = stream("a b");
            s.move_next();

            let sub = s.sub_source(0, 3);

            assert!(sub.token().is_none());
            assert_eq!(s.token().unwrap().text, "a");
        }
    }
}
