use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use serde::Serialize;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use sqlscope::domain::{Dialect, Statement, StatementContext, TablesClause};
use sqlscope::error;
use sqlscope::infra::adapters::dialect_analyzer;
use sqlscope::infra::config::AnalyzerConfig;

/// Analyze a SQL statement and print its clause structure as JSON
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// SQL file to read (stdin when omitted)
    file: Option<PathBuf>,

    /// SQL dialect: ansi, postgres, mysql or sqlserver
    #[arg(short, long)]
    dialect: Option<Dialect>,

    /// Config file (defaults to <config dir>/sqlscope/config.toml)
    #[arg(short, long, env = "SQLSCOPE_CONFIG")]
    config: Option<PathBuf>,

    /// Character offset to report the context and tables in effect for
    #[arg(short, long)]
    offset: Option<usize>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Serialize)]
struct Report<'a> {
    dialect: Dialect,
    statement: Option<&'a Statement>,
    #[serde(skip_serializing_if = "Option::is_none")]
    at_offset: Option<OffsetReport>,
}

#[derive(Serialize)]
struct OffsetReport {
    offset: usize,
    context: Option<StatementContext>,
    tables: Option<TablesClause>,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    error::install_hooks()?;

    let args = Args::parse();

    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = AnalyzerConfig::load_or_default(args.config.as_deref())?;
    let dialect = args.dialect.unwrap_or(config.dialect);
    let sql = read_input(args.file.as_deref())?;

    let analyzer = dialect_analyzer(dialect);
    let statement = match args.offset {
        Some(offset) => analyzer.analyze_at(&sql, offset),
        None => analyzer.analyze_all(&sql).into_iter().next(),
    };
    if statement.is_none() {
        info!(%dialect, "no statement recognized");
    }

    let at_offset = args.offset.map(|offset| OffsetReport {
        offset,
        context: statement.as_ref().and_then(|s| s.context_at_offset(offset)),
        tables: statement.as_ref().and_then(|s| s.tables_in_effect(offset)),
    });
    let report = Report {
        dialect: analyzer.lexer().dialect(),
        statement: statement.as_ref(),
        at_offset,
    };

    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, &report)?;
    writeln!(stdout)?;
    Ok(())
}

fn read_input(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read {}", path.display())),
        None => {
            let mut sql = String::new();
            io::stdin()
                .read_to_string(&mut sql)
                .wrap_err("failed to read SQL from stdin")?;
            Ok(sql)
        }
    }
}
