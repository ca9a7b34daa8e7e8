//! SQL flavours a keyset query can be rendered for.

use std::{fmt, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SqlDialect {
    /// Double-quoted identifiers, numbered `$n` placeholders.
    #[default]
    Postgres,
    /// Backtick identifiers, positional `?` placeholders.
    MySql,
}

impl SqlDialect {
    pub fn quote(self, ident: &str) -> String {
        match self {
            SqlDialect::Postgres => format!("\"{}\"", ident.replace('"', "\"\"")),
            SqlDialect::MySql => format!("`{}`", ident.replace('`', "``")),
        }
    }

    /// Placeholder for the zero-based parameter `index`.
    pub fn placeholder(self, index: usize) -> String {
        match self {
            SqlDialect::Postgres => format!("${}", index + 1),
            SqlDialect::MySql => "?".to_string(),
        }
    }
}

impl fmt::Display for SqlDialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlDialect::Postgres => write!(f, "postgres"),
            SqlDialect::MySql => write!(f, "mysql"),
        }
    }
}

impl FromStr for SqlDialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(SqlDialect::Postgres),
            "mysql" | "mariadb" => Ok(SqlDialect::MySql),
            other => Err(format!("Unknown SQL dialect: {other}")),
        }
    }
}
