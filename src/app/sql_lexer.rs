//! SQL lexer feeding the statement analyzer.
//!
//! Offsets are character offsets. Handles:
//! - Line comments (--) and block comments (/* */)
//! - Single-quoted strings with '' escapes, E'...' and $tag$...$tag$ strings
//! - Quoted identifiers per dialect: "..." always, `...` for MySQL, [...] for SQL Server
//! - Cast operator (::)
//!
//! Unterminated strings, comments and quoted identifiers run to end of input.

use crate::domain::Dialect;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// Upper-cased keyword text.
    Keyword(String),
    /// Raw identifier lexeme, quotes included.
    Identifier(String),
    Operator(String),
    Punctuation(char),
    StringLiteral,
    Number,
    Comment,
    Whitespace,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub start: usize,
    pub end: usize,
}

impl Token {
    pub fn is_keyword(&self, keyword: &str) -> bool {
        matches!(&self.kind, TokenKind::Keyword(k) if k == keyword)
    }

    pub fn is_identifier(&self) -> bool {
        matches!(self.kind, TokenKind::Identifier(_))
    }

    pub fn is_punctuation(&self, c: char) -> bool {
        self.kind == TokenKind::Punctuation(c)
    }

    /// Whitespace and comments, which the analyzer skips.
    pub fn is_trivia(&self) -> bool {
        matches!(self.kind, TokenKind::Whitespace | TokenKind::Comment)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LexerState {
    Normal,
    InSingleQuote,
    InQuotedIdentifier(char),
    InDollarQuote,
    InLineComment,
    InBlockComment,
    InEscapeString,
}

const SQL_KEYWORDS: &[&str] = &[
    "SELECT",
    "FROM",
    "WHERE",
    "JOIN",
    "LEFT",
    "RIGHT",
    "INNER",
    "OUTER",
    "CROSS",
    "FULL",
    "NATURAL",
    "ON",
    "USING",
    "AND",
    "OR",
    "NOT",
    "IN",
    "IS",
    "NULL",
    "TRUE",
    "FALSE",
    "LIKE",
    "ILIKE",
    "BETWEEN",
    "EXISTS",
    "CASE",
    "WHEN",
    "THEN",
    "ELSE",
    "END",
    "AS",
    "DISTINCT",
    "ORDER",
    "BY",
    "ASC",
    "DESC",
    "GROUP",
    "HAVING",
    "LIMIT",
    "OFFSET",
    "UNION",
    "INTERSECT",
    "EXCEPT",
    "ALL",
    "INSERT",
    "INTO",
    "VALUES",
    "UPDATE",
    "SET",
    "DELETE",
    "ONLY",
    "CREATE",
    "DROP",
    "ALTER",
    "TABLE",
    "TEMPORARY",
    "INDEX",
    "VIEW",
    "DATABASE",
    "SCHEMA",
    "PROCEDURE",
    "FUNCTION",
    "BEGIN",
    "DECLARE",
    "IF",
    "RETURNING",
    "WITH",
    "RECURSIVE",
    "LATERAL",
];

pub struct SqlLexer {
    dialect: Dialect,
}

impl SqlLexer {
    pub fn new() -> Self {
        Self::with_dialect(Dialect::default())
    }

    pub fn with_dialect(dialect: Dialect) -> Self {
        Self { dialect }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn tokenize(&self, text: &str) -> Vec<Token> {
        let chars: Vec<char> = text.chars().collect();
        let end_pos = chars.len();
        let mut tokens = Vec::new();
        let mut pos = 0;
        let mut state = LexerState::Normal;
        let mut token_start = 0;
        let mut dollar_tag = String::new();

        while pos < end_pos {
            let c = chars[pos];

            match state {
                LexerState::Normal => {
                    if c.is_whitespace() {
                        let start = pos;
                        while pos < end_pos && chars[pos].is_whitespace() {
                            pos += 1;
                        }
                        tokens.push(Token {
                            kind: TokenKind::Whitespace,
                            text: chars[start..pos].iter().collect(),
                            start,
                            end: pos,
                        });
                        continue;
                    }

                    // Line comment: --
                    if c == '-' && pos + 1 < end_pos && chars[pos + 1] == '-' {
                        token_start = pos;
                        state = LexerState::InLineComment;
                        pos += 2;
                        continue;
                    }

                    // Block comment: /*
                    if c == '/' && pos + 1 < end_pos && chars[pos + 1] == '*' {
                        token_start = pos;
                        state = LexerState::InBlockComment;
                        pos += 2;
                        continue;
                    }

                    // Escape string: E'...'
                    if (c == 'E' || c == 'e') && pos + 1 < end_pos && chars[pos + 1] == '\'' {
                        token_start = pos;
                        state = LexerState::InEscapeString;
                        pos += 2;
                        continue;
                    }

                    // Dollar-quoted string: $tag$...$tag$ or $$...$$
                    if c == '$' {
                        let tag_start = pos;
                        pos += 1;
                        let mut tag = String::new();
                        while pos < end_pos && (chars[pos].is_alphanumeric() || chars[pos] == '_') {
                            tag.push(chars[pos]);
                            pos += 1;
                        }
                        if pos < end_pos && chars[pos] == '$' {
                            pos += 1;
                            token_start = tag_start;
                            dollar_tag = tag;
                            state = LexerState::InDollarQuote;
                        } else {
                            tokens.push(Token {
                                kind: TokenKind::Operator("$".to_string()),
                                text: "$".to_string(),
                                start: tag_start,
                                end: tag_start + 1,
                            });
                            pos = tag_start + 1;
                        }
                        continue;
                    }

                    if c == '\'' {
                        token_start = pos;
                        state = LexerState::InSingleQuote;
                        pos += 1;
                        continue;
                    }

                    if let Some(close) = self.dialect.closing_quote(c) {
                        token_start = pos;
                        state = LexerState::InQuotedIdentifier(close);
                        pos += 1;
                        continue;
                    }

                    // Cast operator: ::
                    if c == ':' && pos + 1 < end_pos && chars[pos + 1] == ':' {
                        tokens.push(Token {
                            kind: TokenKind::Operator("::".to_string()),
                            text: "::".to_string(),
                            start: pos,
                            end: pos + 2,
                        });
                        pos += 2;
                        continue;
                    }

                    if Self::is_operator_char(c) {
                        let start = pos;
                        let mut op = String::new();
                        while pos < end_pos && Self::is_operator_char(chars[pos]) {
                            // A comment opener ends the operator run
                            if (chars[pos] == '-' || chars[pos] == '/')
                                && pos + 1 < end_pos
                                && (chars[pos + 1] == '-' || chars[pos + 1] == '*')
                                && !op.is_empty()
                            {
                                break;
                            }
                            op.push(chars[pos]);
                            pos += 1;
                        }
                        tokens.push(Token {
                            kind: TokenKind::Operator(op.clone()),
                            text: op,
                            start,
                            end: pos,
                        });
                        continue;
                    }

                    if Self::is_punctuation(c) {
                        tokens.push(Token {
                            kind: TokenKind::Punctuation(c),
                            text: c.to_string(),
                            start: pos,
                            end: pos + 1,
                        });
                        pos += 1;
                        continue;
                    }

                    if c.is_ascii_digit() {
                        let start = pos;
                        while pos < end_pos && (chars[pos].is_ascii_digit() || chars[pos] == '.') {
                            pos += 1;
                        }
                        tokens.push(Token {
                            kind: TokenKind::Number,
                            text: chars[start..pos].iter().collect(),
                            start,
                            end: pos,
                        });
                        continue;
                    }

                    // Identifier or keyword; @ and # start T-SQL variables and temp tables
                    if c.is_alphabetic() || c == '_' || c == '@' || c == '#' {
                        let start = pos;
                        pos += 1;
                        while pos < end_pos
                            && (chars[pos].is_alphanumeric() || chars[pos] == '_' || chars[pos] == '$')
                        {
                            pos += 1;
                        }
                        let text: String = chars[start..pos].iter().collect();
                        let upper = text.to_uppercase();
                        let kind = if SQL_KEYWORDS.contains(&upper.as_str()) {
                            TokenKind::Keyword(upper)
                        } else {
                            TokenKind::Identifier(text.clone())
                        };
                        tokens.push(Token {
                            kind,
                            text,
                            start,
                            end: pos,
                        });
                        continue;
                    }

                    tokens.push(Token {
                        kind: TokenKind::Unknown,
                        text: c.to_string(),
                        start: pos,
                        end: pos + 1,
                    });
                    pos += 1;
                }

                LexerState::InSingleQuote => {
                    if c == '\'' {
                        if pos + 1 < end_pos && chars[pos + 1] == '\'' {
                            pos += 2;
                            continue;
                        }
                        tokens.push(Token {
                            kind: TokenKind::StringLiteral,
                            text: chars[token_start..=pos].iter().collect(),
                            start: token_start,
                            end: pos + 1,
                        });
                        state = LexerState::Normal;
                    }
                    pos += 1;
                }

                LexerState::InQuotedIdentifier(close) => {
                    if c == close {
                        // Doubled closing quote is an escaped quote
                        if pos + 1 < end_pos && chars[pos + 1] == close {
                            pos += 2;
                            continue;
                        }
                        let text: String = chars[token_start..=pos].iter().collect();
                        tokens.push(Token {
                            kind: TokenKind::Identifier(text.clone()),
                            text,
                            start: token_start,
                            end: pos + 1,
                        });
                        state = LexerState::Normal;
                    }
                    pos += 1;
                }

                LexerState::InDollarQuote => {
                    if c == '$' {
                        let tag_start = pos;
                        pos += 1;
                        let mut closing_tag = String::new();
                        while pos < end_pos && (chars[pos].is_alphanumeric() || chars[pos] == '_') {
                            closing_tag.push(chars[pos]);
                            pos += 1;
                        }
                        if pos < end_pos && chars[pos] == '$' && closing_tag == dollar_tag {
                            pos += 1;
                            tokens.push(Token {
                                kind: TokenKind::StringLiteral,
                                text: chars[token_start..pos].iter().collect(),
                                start: token_start,
                                end: pos,
                            });
                            state = LexerState::Normal;
                            dollar_tag.clear();
                        } else {
                            pos = tag_start + 1;
                        }
                        continue;
                    }
                    pos += 1;
                }

                LexerState::InLineComment => {
                    if c == '\n' {
                        tokens.push(Token {
                            kind: TokenKind::Comment,
                            text: chars[token_start..pos].iter().collect(),
                            start: token_start,
                            end: pos,
                        });
                        state = LexerState::Normal;
                        // Newline is left for the whitespace run
                        continue;
                    }
                    pos += 1;
                }

                LexerState::InBlockComment => {
                    if c == '*' && pos + 1 < end_pos && chars[pos + 1] == '/' {
                        pos += 2;
                        tokens.push(Token {
                            kind: TokenKind::Comment,
                            text: chars[token_start..pos].iter().collect(),
                            start: token_start,
                            end: pos,
                        });
                        state = LexerState::Normal;
                        continue;
                    }
                    pos += 1;
                }

                LexerState::InEscapeString => {
                    if c == '\\' && pos + 1 < end_pos {
                        pos += 2;
                        continue;
                    }
                    if c == '\'' {
                        tokens.push(Token {
                            kind: TokenKind::StringLiteral,
                            text: chars[token_start..=pos].iter().collect(),
                            start: token_start,
                            end: pos + 1,
                        });
                        state = LexerState::Normal;
                    }
                    pos += 1;
                }
            }
        }

        let unterminated = match state {
            LexerState::Normal => None,
            LexerState::InSingleQuote | LexerState::InDollarQuote | LexerState::InEscapeString => {
                Some(TokenKind::StringLiteral)
            }
            LexerState::InQuotedIdentifier(_) => Some(TokenKind::Identifier(
                chars[token_start..end_pos].iter().collect(),
            )),
            LexerState::InLineComment | LexerState::InBlockComment => Some(TokenKind::Comment),
        };
        if let Some(kind) = unterminated {
            tokens.push(Token {
                kind,
                text: chars[token_start..end_pos].iter().collect(),
                start: token_start,
                end: end_pos,
            });
        }

        tokens
    }

    fn is_operator_char(c: char) -> bool {
        matches!(
            c,
            '+' | '-' | '*' | '/' | '<' | '>' | '=' | '!' | '%' | '&' | '|' | '^' | '~' | ':'
        )
    }

    fn is_punctuation(c: char) -> bool {
        matches!(c, '(' | ')' | ',' | ';' | '.' | '[' | ']')
    }

    /// Splits a token stream into statement spans at top-level semicolons.
    ///
    /// Semicolons inside parentheses or inside BEGIN/CASE ... END blocks do
    /// not split. Each span runs from the first significant token to the end
    /// of the last significant token before the semicolon.
    pub fn statement_spans(&self, tokens: &[Token]) -> Vec<(usize, usize)> {
        let significant: Vec<&Token> = tokens.iter().filter(|t| !t.is_trivia()).collect();
        let mut spans = Vec::new();
        let mut current: Option<(usize, usize)> = None;
        let mut in_create = false;
        let mut paren_depth = 0usize;
        let mut block_depth = 0usize;

        for (i, token) in significant.iter().enumerate() {
            let next = significant.get(i + 1).copied();
            match &token.kind {
                TokenKind::Punctuation(';') if paren_depth == 0 && block_depth == 0 => {
                    if let Some(span) = current.take() {
                        spans.push(span);
                    }
                    continue;
                }
                TokenKind::Punctuation('(') => paren_depth += 1,
                TokenKind::Punctuation(')') => paren_depth = paren_depth.saturating_sub(1),
                TokenKind::Keyword(kw) if kw == "BEGIN" => {
                    if (current.is_some() && in_create) || !begins_transaction(next) {
                        block_depth += 1;
                    }
                }
                TokenKind::Keyword(kw) if kw == "CASE" => block_depth += 1,
                TokenKind::Keyword(kw) if kw == "END" && !ends_control_flow(next) => {
                    block_depth = block_depth.saturating_sub(1);
                }
                _ => {}
            }
            current = Some(match current {
                Some((start, _)) => (start, token.end),
                None => {
                    in_create = token.is_keyword("CREATE");
                    (token.start, token.end)
                }
            });
        }

        if let Some(span) = current {
            spans.push(span);
        }
        spans
    }
}

/// `BEGIN` of a transaction (`BEGIN;`, `BEGIN TRANSACTION`, `BEGIN WORK`,
/// `BEGIN TRAN`) rather than of a block, judged by the token after it.
pub fn begins_transaction(next: Option<&Token>) -> bool {
    match next {
        None => true,
        Some(token) => {
            token.is_punctuation(';')
                || ["TRANSACTION", "TRAN", "WORK"]
                    .iter()
                    .any(|word| token.text.eq_ignore_ascii_case(word))
        }
    }
}

/// `END` of `END IF`, `END LOOP`, `END WHILE` or `END REPEAT`, which closes a
/// control-flow statement and not a `BEGIN` or `CASE` block.
pub fn ends_control_flow(next: Option<&Token>) -> bool {
    next.is_some_and(|token| {
        ["IF", "LOOP", "WHILE", "REPEAT"]
            .iter()
            .any(|word| token.text.eq_ignore_ascii_case(word))
    })
}

impl Default for SqlLexer {
    fn default() -> Self {
        Self::new()
    }
}
