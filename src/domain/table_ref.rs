use std::cmp::Ordering;

use serde::Serialize;

use super::qualified_ident::{QualifiedIdent, cmp_str_ignore_case};

/// A table or view named in a table list, with its optional alias.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct TableRef {
    table: QualifiedIdent,
    alias: Option<String>,
}

impl TableRef {
    /// An empty alias is treated as no alias.
    pub fn new(table: QualifiedIdent, alias: Option<String>) -> Self {
        Self {
            table,
            alias: alias.filter(|a| !a.is_empty()),
        }
    }

    pub fn table(&self) -> &QualifiedIdent {
        &self.table
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// Aliased references compare by alias, anything else by table name,
    /// both ignoring case.
    pub fn cmp_ignore_case(&self, other: &Self) -> Ordering {
        match (&self.alias, &other.alias) {
            (Some(a), Some(b)) => cmp_str_ignore_case(a, b),
            _ => self.table.cmp_ignore_case(&other.table),
        }
    }
}
