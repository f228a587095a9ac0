/// Turns a raw identifier lexeme into the name it denotes.
#[cfg_attr(test, mockall::automock)]
pub trait Quoter: Send + Sync {
    fn unquote(&self, raw: &str) -> String;
}
