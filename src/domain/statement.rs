use std::fmt;

use serde::Serialize;

use super::context::{ContextMap, StatementContext};
use super::qualified_ident::QualifiedIdent;
use super::tables_clause::TablesClause;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatementKind {
    Select,
    Insert,
    Update,
    Delete,
    Drop,
    Create,
}

impl StatementKind {
    /// Maps an upper-cased leading keyword to the statement kind it starts.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "SELECT" => Some(Self::Select),
            "INSERT" => Some(Self::Insert),
            "UPDATE" => Some(Self::Update),
            "DELETE" => Some(Self::Delete),
            "DROP" => Some(Self::Drop),
            "CREATE" => Some(Self::Create),
            _ => None,
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Self::Select => "SELECT",
            Self::Insert => "INSERT",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
            Self::Drop => "DROP",
            Self::Create => "CREATE",
        }
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Kind-specific facts gathered alongside the shared statement structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatementDetails {
    Select {
        /// One parts-list per projection item.
        select_values: Vec<Vec<String>>,
    },
    Insert {
        table: Option<QualifiedIdent>,
        columns: Vec<String>,
        /// Bare identifiers from the VALUES list; literals are not captured.
        values: Vec<String>,
    },
    Update,
    Delete,
    Drop {
        table: Option<QualifiedIdent>,
    },
    Create {
        body_start: usize,
        body_end: usize,
    },
}

impl StatementDetails {
    pub fn kind(&self) -> StatementKind {
        match self {
            Self::Select { .. } => StatementKind::Select,
            Self::Insert { .. } => StatementKind::Insert,
            Self::Update => StatementKind::Update,
            Self::Delete => StatementKind::Delete,
            Self::Drop { .. } => StatementKind::Drop,
            Self::Create { .. } => StatementKind::Create,
        }
    }
}

/// Result of analyzing one statement: its span, the clause recorded for
/// every offset, the tables it names and the subqueries nested inside it.
///
/// Offsets are character offsets into the analyzed text; `end` is exclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Statement {
    #[serde(flatten)]
    details: StatementDetails,
    start: usize,
    end: usize,
    contexts: ContextMap,
    tables: Option<TablesClause>,
    subqueries: Vec<Statement>,
}

impl Statement {
    pub fn new(
        details: StatementDetails,
        start: usize,
        end: usize,
        contexts: ContextMap,
        tables: Option<TablesClause>,
        subqueries: Vec<Self>,
    ) -> Self {
        Self {
            details,
            start,
            end,
            contexts,
            tables,
            subqueries,
        }
    }

    pub fn kind(&self) -> StatementKind {
        self.details.kind()
    }

    pub fn details(&self) -> &StatementDetails {
        &self.details
    }

    pub fn start_offset(&self) -> usize {
        self.start
    }

    pub fn end_offset(&self) -> usize {
        self.end
    }

    pub fn contains_offset(&self, offset: usize) -> bool {
        self.start <= offset && offset <= self.end
    }

    pub fn contexts(&self) -> &ContextMap {
        &self.contexts
    }

    /// `None` when the statement never reached its table list.
    pub fn tables_clause(&self) -> Option<&TablesClause> {
        self.tables.as_ref()
    }

    pub fn subqueries(&self) -> &[Self] {
        &self.subqueries
    }

    /// Context at `offset`, answered by the innermost subquery covering it
    /// when that subquery has an answer.
    pub fn context_at_offset(&self, offset: usize) -> Option<StatementContext> {
        self.subqueries
            .iter()
            .filter(|subquery| subquery.contains_offset(offset))
            .find_map(|subquery| subquery.context_at_offset(offset))
            .or_else(|| self.contexts.context_at(offset))
    }

    /// Statements covering `offset`, outermost first.
    pub fn statement_path(&self, offset: usize) -> Vec<&Self> {
        let mut path = Vec::new();
        self.fill_statement_path(offset, &mut path);
        path
    }

    fn fill_statement_path<'a>(&'a self, offset: usize, path: &mut Vec<&'a Self>) {
        if !self.contains_offset(offset) {
            return;
        }
        path.push(self);
        for subquery in &self.subqueries {
            subquery.fill_statement_path(offset, path);
        }
    }

    /// Tables visible at `offset`: the scopes of every statement covering it,
    /// merged so that inner aliases win over outer ones.
    pub fn tables_in_effect(&self, offset: usize) -> Option<TablesClause> {
        let path = self.statement_path(offset);
        if let [only] = path.as_slice() {
            return only.tables.clone();
        }
        let scopes: Vec<&TablesClause> = path
            .iter()
            .rev()
            .filter_map(|statement| statement.tables.as_ref())
            .collect();
        if scopes.is_empty() {
            return None;
        }
        Some(TablesClause::merge_scopes(scopes))
    }

    pub fn select_values(&self) -> Option<&[Vec<String>]> {
        match &self.details {
            StatementDetails::Select { select_values } => Some(select_values),
            _ => None,
        }
    }

    pub fn insert_table(&self) -> Option<&QualifiedIdent> {
        match &self.details {
            StatementDetails::Insert { table, .. } => table.as_ref(),
            _ => None,
        }
    }

    pub fn insert_columns(&self) -> Option<&[String]> {
        match &self.details {
            StatementDetails::Insert { columns, .. } => Some(columns),
            _ => None,
        }
    }

    pub fn insert_values(&self) -> Option<&[String]> {
        match &self.details {
            StatementDetails::Insert { values, .. } => Some(values),
            _ => None,
        }
    }

    pub fn dropped_table(&self) -> Option<&QualifiedIdent> {
        match &self.details {
            StatementDetails::Drop { table } => table.as_ref(),
            _ => None,
        }
    }

    /// Span between `BEGIN` and `END` of a routine, keywords excluded.
    pub fn body_offsets(&self) -> Option<(usize, usize)> {
        match self.details {
            StatementDetails::Create {
                body_start,
                body_end,
            } => Some((body_start, body_end)),
            _ => None,
        }
    }

    pub fn has_body(&self) -> bool {
        self.body_offsets()
            .is_some_and(|(start, end)| end > start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TableRef;

    fn ident(name: &str) -> QualifiedIdent {
        QualifiedIdent::new([name])
    }

    fn clause(refs: &[(&str, Option<&str>)]) -> TablesClause {
        let refs: Vec<TableRef> = refs
            .iter()
            .map(|(name, alias)| TableRef::new(ident(name), alias.map(str::to_string)))
            .collect();
        TablesClause::from_table_refs(&refs)
    }

    fn select(start: usize, end: usize, tables: TablesClause, subqueries: Vec<Statement>) -> Statement {
        let mut contexts = ContextMap::default();
        contexts.record(start, StatementContext::Start);
        contexts.record(start + 6, StatementContext::Select);
        Statement::new(
            StatementDetails::Select {
                select_values: Vec::new(),
            },
            start,
            end,
            contexts,
            Some(tables),
            subqueries,
        )
    }

    mod kind {
        use super::*;
        use rstest::rstest;

        #[rstest]
        #[case("SELECT", Some(StatementKind::Select))]
        #[case("CREATE", Some(StatementKind::Create))]
        #[case("DECLARE", None)]
        fn from_keyword(#[case] keyword: &str, #[case] expected: Option<StatementKind>) {
            assert_eq!(StatementKind::from_keyword(keyword), expected);
        }
    }

    mod lookup {
        use super::*;

        #[test]
        fn subquery_answers_for_offsets_inside_it() {
            let inner = select(20, 40, clause(&[("t", None)]), Vec::new());
            let outer = select(0, 50, clause(&[("u", None)]), vec![inner]);

            assert_eq!(outer.context_at_offset(30), Some(StatementContext::Select));
            assert_eq!(outer.context_at_offset(22), Some(StatementContext::Start));
        }

        #[test]
        fn offset_outside_statement_has_empty_path() {
            let statement = select(10, 20, clause(&[]), Vec::new());

            assert!(statement.statement_path(25).is_empty());
            assert_eq!(statement.tables_in_effect(25), None);
        }

        #[test]
        fn tables_in_effect_merges_inner_first() {
            let inner = select(20, 40, clause(&[("inner_t", Some("x"))]), Vec::new());
            let outer = select(
                0,
                50,
                clause(&[("outer_t", Some("x")), ("plain", None)]),
                vec![inner],
            );

            let tables = outer.tables_in_effect(30).unwrap();

            assert_eq!(tables.table_for_alias("x"), Some(&ident("inner_t")));
            assert_eq!(tables.unaliased_tables(), &[ident("plain")]);
        }

        #[test]
        fn tables_in_effect_outside_subquery_is_own_clause() {
            let inner = select(20, 40, clause(&[("t", None)]), Vec::new());
            let outer = select(0, 50, clause(&[("u", None)]), vec![inner]);

            let tables = outer.tables_in_effect(45).unwrap();

            assert_eq!(tables.unaliased_tables(), &[ident("u")]);
        }
    }

    mod details {
        use super::*;

        #[test]
        fn create_without_body_has_no_body() {
            let statement = Statement::new(
                StatementDetails::Create {
                    body_start: 17,
                    body_end: 0,
                },
                0,
                20,
                ContextMap::default(),
                None,
                Vec::new(),
            );

            assert!(!statement.has_body());
            assert_eq!(statement.kind(), StatementKind::Create);
        }

        #[test]
        fn accessors_of_other_kinds_are_none() {
            let statement = select(0, 10, clause(&[]), Vec::new());

            assert_eq!(statement.insert_table(), None);
            assert_eq!(statement.dropped_table(), None);
            assert_eq!(statement.body_offsets(), None);
        }

        #[test]
        fn serializes_kind_tag_inline() {
            let statement = select(0, 10, clause(&[]), Vec::new());

            let json = serde_json::to_value(&statement).unwrap();

            assert_eq!(json["kind"], "SELECT");
            assert_eq!(json["contexts"]["6"], "SELECT");
        }
    }
}
