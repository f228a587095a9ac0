use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// SQL dialect, as far as identifier quoting is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[default]
    Ansi,
    Postgres,
    MySql,
    SqlServer,
}

const DOUBLE_QUOTES: &[(char, char)] = &[('"', '"')];
const MYSQL_QUOTES: &[(char, char)] = &[('"', '"'), ('`', '`')];
const SQLSERVER_QUOTES: &[(char, char)] = &[('"', '"'), ('[', ']')];

impl Dialect {
    /// Opening and closing characters of quoted identifiers.
    pub fn identifier_quotes(self) -> &'static [(char, char)] {
        match self {
            Self::Ansi | Self::Postgres => DOUBLE_QUOTES,
            Self::MySql => MYSQL_QUOTES,
            Self::SqlServer => SQLSERVER_QUOTES,
        }
    }

    pub fn closing_quote(self, open: char) -> Option<char> {
        self.identifier_quotes()
            .iter()
            .find(|(o, _)| *o == open)
            .map(|(_, close)| *close)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ansi => "ansi",
            Self::Postgres => "postgres",
            Self::MySql => "mysql",
            Self::SqlServer => "sqlserver",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown dialect '{0}' (expected ansi, postgres, mysql or sqlserver)")]
pub struct UnknownDialect(pub String);

impl FromStr for Dialect {
    type Err = UnknownDialect;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ansi" => Ok(Self::Ansi),
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "mysql" | "mariadb" => Ok(Self::MySql),
            "sqlserver" | "mssql" => Ok(Self::SqlServer),
            _ => Err(UnknownDialect(s.to_string())),
        }
    }
}
