pub mod context;
pub mod dialect;
pub mod qualified_ident;
pub mod statement;
pub mod table_ref;
pub mod tables_clause;

pub use context::{ContextMap, StatementContext};
pub use dialect::{Dialect, UnknownDialect};
pub use qualified_ident::QualifiedIdent;
pub use statement::{Statement, StatementDetails, StatementKind};
pub use table_ref::TableRef;
pub use tables_clause::TablesClause;
