pub use sqlscope_domain as domain;

pub mod analyzer;
pub mod ports;
pub mod sql_lexer;
pub mod token_stream;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use analyzer::{SqlAnalyzer, analyze, analyze_as, analyze_kind};
