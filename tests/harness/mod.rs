use sqlscope::app::SqlAnalyzer;
use sqlscope::domain::{Dialect, Statement, StatementDetails, TablesClause};
use sqlscope::infra::adapters::dialect_analyzer;

pub use sqlscope::app::test_support::offset_of;

pub fn ansi_analyzer() -> SqlAnalyzer {
    dialect_analyzer(Dialect::Ansi)
}

/// Indented, line-per-fact rendering of a statement tree.
pub fn outline(statement: &Statement) -> String {
    let mut lines = Vec::new();
    push_outline(statement, 0, &mut lines);
    lines.join("\n")
}

pub fn outline_all(statements: &[Statement]) -> String {
    statements
        .iter()
        .map(outline)
        .collect::<Vec<_>>()
        .join("\n")
}

fn push_outline(statement: &Statement, depth: usize, lines: &mut Vec<String>) {
    let indent = "  ".repeat(depth);
    lines.push(format!(
        "{indent}{} {}..{}",
        statement.kind(),
        statement.start_offset(),
        statement.end_offset()
    ));

    let contexts = statement
        .contexts()
        .iter()
        .map(|(offset, context)| format!("{offset}:{context}"))
        .collect::<Vec<_>>()
        .join(" ");
    lines.push(format!("{indent}  contexts {contexts}"));

    if let Some(tables) = statement.tables_clause() {
        lines.push(format!("{indent}  tables {}", describe_tables(tables)));
    }
    match statement.details() {
        StatementDetails::Create {
            body_start,
            body_end,
        } if statement.has_body() => {
            lines.push(format!("{indent}  body {body_start}..{body_end}"));
        }
        StatementDetails::Drop { table: Some(table) } => {
            lines.push(format!("{indent}  drop {table}"));
        }
        _ => {}
    }

    for subquery in statement.subqueries() {
        push_outline(subquery, depth + 1, lines);
    }
}

fn describe_tables(tables: &TablesClause) -> String {
    let mut parts: Vec<String> = tables
        .unaliased_tables()
        .iter()
        .map(ToString::to_string)
        .collect();
    parts.extend(
        tables
            .aliased_tables()
            .iter()
            .map(|(alias, table)| format!("{alias}={table}")),
    );
    parts.extend(
        tables
            .derived_aliases()
            .iter()
            .map(|alias| format!("{alias}=(subquery)")),
    );
    if parts.is_empty() {
        "(none)".to_string()
    } else {
        parts.join(", ")
    }
}
