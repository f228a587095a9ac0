pub mod dialect_quoter;

pub use dialect_quoter::{DialectQuoter, dialect_analyzer};
