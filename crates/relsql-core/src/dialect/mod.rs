//! SQL dialect support.
//!
//! Each dialect is a [`Renderer`] that supplies identifier quoting, the
//! placeholder style and, where the dialect spells them differently, the
//! regex and case-sensitivity comparison operators.

mod mysql;
mod postgres;
mod sqlite;

pub use mysql::MysqlRenderer;
pub use postgres::PostgresRenderer;
pub use sqlite::SqliteRenderer;

use serde::{Deserialize, Serialize};

use crate::render::{RenderOptions, Renderer};

/// The supported dialects.
///
/// Deserialises from lowercase names, so a dialect can be picked in an
/// application's configuration:
///
/// ```rust
/// use relsql_core::{Dialect, RenderOptions};
///
/// let dialect: Dialect = serde_json::from_str("\"sqlite\"").unwrap();
/// let renderer = dialect.renderer(RenderOptions::default());
/// assert_eq!(renderer.dialect_name(), "sqlite");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// Double-quoted identifiers, `$N` placeholders.
    Postgres,
    /// Backtick identifiers, `?` placeholders.
    Mysql,
    /// Double-quoted identifiers, `?` placeholders.
    Sqlite,
}

impl Dialect {
    /// Returns the name of the dialect.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Postgres => "postgres",
            Self::Mysql => "mysql",
            Self::Sqlite => "sqlite",
        }
    }

    /// Creates a renderer for this dialect.
    #[must_use]
    pub fn renderer(&self, options: RenderOptions) -> Box<dyn Renderer + Send> {
        match self {
            Self::Postgres => Box::new(PostgresRenderer::with_options(options)),
            Self::Mysql => Box::new(MysqlRenderer::with_options(options)),
            Self::Sqlite => Box::new(SqliteRenderer::with_options(options)),
        }
    }
}
