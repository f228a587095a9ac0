use crate::sql_lexer::Token;

/// Cursor over a lexed token range.
///
/// A fresh source sits before its first token. `sub_source` narrows to the
/// tokens lying entirely within `[start, end)` character offsets.
pub trait TokenSource {
    fn move_start(&mut self);

    /// Advances one token. On failure the cursor stays where it was.
    fn move_next(&mut self) -> bool;

    /// Steps back one token; false at the first token of the range.
    fn move_previous(&mut self) -> bool;

    fn token(&self) -> Option<&Token>;

    fn sub_source(&self, start: usize, end: usize) -> Self
    where
        Self: Sized;
}
