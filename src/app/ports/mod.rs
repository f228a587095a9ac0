pub mod quoter;
pub mod token_source;

pub use quoter::Quoter;
pub use token_source::TokenSource;
