use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use super::qualified_ident::{QualifiedIdent, cmp_str_ignore_case};
use super::table_ref::TableRef;

/// The tables visible to one statement or subquery scope.
///
/// Built once from the scope's table references. The first table seen for
/// an alias wins; later duplicates of that alias, in any case, are ignored.
/// Alias and table lookups ignore case.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct TablesClause {
    unaliased: Vec<QualifiedIdent>,
    aliased: BTreeMap<String, QualifiedIdent>,
    /// Aliases given to parenthesized subqueries in a table list.
    derived_aliases: BTreeSet<String>,
}

impl TablesClause {
    pub fn from_table_refs<'a, I>(refs: I) -> Self
    where
        I: IntoIterator<Item = &'a TableRef>,
    {
        let mut clause = Self::default();
        for table_ref in refs {
            match table_ref.alias() {
                Some(alias) => clause.add_aliased(alias, table_ref.table()),
                None => clause.add_unaliased(table_ref.table()),
            }
        }
        clause
    }

    pub fn with_derived_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.derived_aliases
            .extend(aliases.into_iter().map(Into::into));
        self
    }

    /// Merges nested scopes, innermost first: an alias bound by an inner
    /// scope shadows the same alias in any enclosing scope.
    pub fn merge_scopes<'a, I>(innermost_first: I) -> Self
    where
        I: IntoIterator<Item = &'a Self>,
    {
        let mut merged = Self::default();
        for scope in innermost_first {
            for table in &scope.unaliased {
                merged.add_unaliased(table);
            }
            for (alias, table) in &scope.aliased {
                merged.add_aliased(alias, table);
            }
            merged
                .derived_aliases
                .extend(scope.derived_aliases.iter().cloned());
        }
        merged
    }

    fn add_unaliased(&mut self, table: &QualifiedIdent) {
        if !self.unaliased.iter().any(|t| t.eq_ignore_case(table)) {
            self.unaliased.push(table.clone());
        }
    }

    fn add_aliased(&mut self, alias: &str, table: &QualifiedIdent) {
        if self.table_for_alias(alias).is_none() {
            self.aliased.insert(alias.to_string(), table.clone());
        }
    }

    pub fn unaliased_tables(&self) -> &[QualifiedIdent] {
        &self.unaliased
    }

    pub fn aliased_tables(&self) -> &BTreeMap<String, QualifiedIdent> {
        &self.aliased
    }

    pub fn derived_aliases(&self) -> &BTreeSet<String> {
        &self.derived_aliases
    }

    pub fn table_for_alias(&self, alias: &str) -> Option<&QualifiedIdent> {
        self.aliased
            .iter()
            .find(|(bound, _)| cmp_str_ignore_case(bound, alias) == Ordering::Equal)
            .map(|(_, table)| table)
    }

    pub fn is_empty(&self) -> bool {
        self.unaliased.is_empty() && self.aliased.is_empty() && self.derived_aliases.is_empty()
    }
}
