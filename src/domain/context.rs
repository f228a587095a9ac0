use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// Syntactic position inside a statement's grammar.
///
/// Values are sparse so new positions can slot in between existing ones.
/// Within one grammar a statement only moves to higher values, apart from
/// returning from `JoinCondition` to the table list it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u16)]
pub enum StatementContext {
    Start = 0,
    Delete = 200,
    Drop = 300,
    DropTable = 310,
    Insert = 400,
    InsertInto = 410,
    Columns = 420,
    Values = 430,
    Select = 500,
    From = 510,
    JoinCondition = 520,
    Where = 530,
    Group = 540,
    GroupBy = 550,
    Having = 560,
    Order = 570,
    OrderBy = 580,
    Update = 600,
    Set = 610,
    Create = 700,
    CreateProcedure = 710,
    CreateFunction = 720,
    Begin = 730,
    End = 740,
    CreateTable = 750,
    CreateTemporaryTable = 760,
    CreateDatabase = 770,
    CreateSchema = 780,
    CreateView = 790,
    CreateViewAs = 800,
}

impl StatementContext {
    pub fn value(self) -> u16 {
        self as u16
    }

    /// True when `self` is `other` or any later position.
    pub fn is_after(self, other: Self) -> bool {
        self >= other
    }

    /// Positions belonging to the SELECT grammar, from the projection list
    /// through ORDER BY.
    pub fn is_select_clause(self) -> bool {
        (Self::Select..=Self::OrderBy).contains(&self)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Start => "START",
            Self::Delete => "DELETE",
            Self::Drop => "DROP",
            Self::DropTable => "DROP_TABLE",
            Self::Insert => "INSERT",
            Self::InsertInto => "INSERT_INTO",
            Self::Columns => "COLUMNS",
            Self::Values => "VALUES",
            Self::Select => "SELECT",
            Self::From => "FROM",
            Self::JoinCondition => "JOIN_CONDITION",
            Self::Where => "WHERE",
            Self::Group => "GROUP",
            Self::GroupBy => "GROUP_BY",
            Self::Having => "HAVING",
            Self::Order => "ORDER",
            Self::OrderBy => "ORDER_BY",
            Self::Update => "UPDATE",
            Self::Set => "SET",
            Self::Create => "CREATE",
            Self::CreateProcedure => "CREATE_PROCEDURE",
            Self::CreateFunction => "CREATE_FUNCTION",
            Self::Begin => "BEGIN",
            Self::End => "END",
            Self::CreateTable => "CREATE_TABLE",
            Self::CreateTemporaryTable => "CREATE_TEMPORARY_TABLE",
            Self::CreateDatabase => "CREATE_DATABASE",
            Self::CreateSchema => "CREATE_SCHEMA",
            Self::CreateView => "CREATE_VIEW",
            Self::CreateViewAs => "CREATE_VIEW_AS",
        }
    }
}

impl fmt::Display for StatementContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Offset → context transitions recorded while parsing.
///
/// A transition is keyed by the offset just past the token that triggered
/// it, so an offset sitting on the keyword itself still sees the previous
/// context.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct ContextMap {
    transitions: BTreeMap<usize, StatementContext>,
}

impl ContextMap {
    pub fn record(&mut self, offset: usize, context: StatementContext) {
        self.transitions.insert(offset, context);
    }

    /// The context of the greatest recorded offset not past `offset`.
    pub fn context_at(&self, offset: usize) -> Option<StatementContext> {
        self.transitions
            .range(..=offset)
            .next_back()
            .map(|(_, context)| *context)
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, StatementContext)> + '_ {
        self.transitions.iter().map(|(offset, context)| (*offset, *context))
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }
}
