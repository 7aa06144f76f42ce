//! The dialect adapter seam.
//!
//! Every backend interaction of the engine goes through [`DialectAdapter`].
//! Dialect branching lives in the adapter implementations (`strata_sqlite`,
//! `strata_pg`) and nowhere else; migration bodies only describe the end
//! state they want.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::schema::{ColumnChange, ColumnDef, ColumnInfo, IndexDef, TableShape};
use crate::value::{Row, Value};

/// The two supported SQL dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// Embedded single-file engine.
    Sqlite,
    /// Client-server engine.
    Postgres,
}

impl Dialect {
    /// Lower-case name used in logs and configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            Dialect::Sqlite => "sqlite",
            Dialect::Postgres => "postgres",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dialect {
    type Err = AdapterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" | "sqlite3" => Ok(Dialect::Sqlite),
            "postgres" | "postgresql" | "pg" => Ok(Dialect::Postgres),
            other => Err(AdapterError::other(format!("unknown dialect '{other}'"))),
        }
    }
}

/// Classification of an adapter failure.
///
/// Adapters classify driver errors into these kinds once; callers match on
/// the kind and never on driver message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterErrorKind {
    /// A unique or primary key constraint rejected a write.
    UniqueViolation,
    /// The adapter declines the operation on this dialect.
    Unsupported,
    /// A column value could not be mapped to a [`Value`].
    Decode,
    /// Anything else reported by the backend.
    Database,
}

/// An error raised by a [`DialectAdapter`].
#[derive(Debug, thiserror::Error)]
#[error("{dialect} adapter: {message}")]
pub struct AdapterError {
    /// Dialect that raised the error, when known.
    pub dialect: DialectTag,
    /// Classification.
    pub kind: AdapterErrorKind,
    /// Human readable detail.
    pub message: String,
    /// Underlying driver error, when one exists.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

/// Display helper so errors raised before a dialect is known still render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialectTag(pub Option<Dialect>);

impl fmt::Display for DialectTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(dialect) => dialect.fmt(f),
            None => f.write_str("unknown"),
        }
    }
}

impl AdapterError {
    /// Creates an error of the given kind.
    pub fn new(dialect: Dialect, kind: AdapterErrorKind, message: impl Into<String>) -> Self {
        Self {
            dialect: DialectTag(Some(dialect)),
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// A generic error not tied to a dialect.
    pub fn other(message: impl Into<String>) -> Self {
        Self {
            dialect: DialectTag(None),
            kind: AdapterErrorKind::Database,
            message: message.into(),
            source: None,
        }
    }

    /// A value that could not be decoded, not tied to a dialect.
    pub fn decode(message: impl Into<String>) -> Self {
        Self {
            kind: AdapterErrorKind::Decode,
            ..Self::other(message)
        }
    }

    /// The adapter refuses `operation` on `dialect`.
    pub fn unsupported(dialect: Dialect, operation: impl Into<String>) -> Self {
        Self::new(dialect, AdapterErrorKind::Unsupported, operation)
    }

    /// Attaches the driver error.
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// True when a unique constraint rejected the write.
    pub fn is_unique_violation(&self) -> bool {
        self.kind == AdapterErrorKind::UniqueViolation
    }

    /// True when the adapter declined the operation.
    pub fn is_unsupported(&self) -> bool {
        self.kind == AdapterErrorKind::Unsupported
    }
}

/// Executes logical schema and data operations against one dialect.
///
/// Implementations must give equivalent end states for every operation on
/// both dialects and must be idempotent where noted: calling a creating
/// operation against a backend that already has the target object is a
/// no-op, not an error.
#[async_trait]
pub trait DialectAdapter: Send + Sync {
    /// The dialect this adapter speaks.
    fn dialect(&self) -> Dialect;

    /// Executes a statement with `$1`-style positional parameters and
    /// returns the number of affected rows.
    async fn execute(&self, sql: &str, params: &[Value]) -> Result<u64, AdapterError>;

    /// Runs a query with `$1`-style positional parameters.
    async fn fetch_all(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>, AdapterError>;

    /// Runs a query and returns the first row, if any.
    async fn fetch_optional(&self, sql: &str, params: &[Value]) -> Result<Option<Row>, AdapterError> {
        Ok(self.fetch_all(sql, params).await?.into_iter().next())
    }

    /// True if a table named `table` exists.
    async fn table_exists(&self, table: &str) -> Result<bool, AdapterError>;

    /// Lists the columns of `table` in declaration order. Empty when the
    /// table does not exist.
    async fn describe_table(&self, table: &str) -> Result<Vec<ColumnInfo>, AdapterError>;

    /// Creates the table and its indexes if absent.
    async fn create_table(&self, shape: &TableShape) -> Result<(), AdapterError>;

    /// Creates an index if absent.
    async fn create_index(&self, index: &IndexDef) -> Result<(), AdapterError>;

    /// Drops a table if present.
    async fn drop_table(&self, table: &str) -> Result<(), AdapterError>;

    /// Adds a column if absent.
    async fn add_column(&self, table: &str, column: &ColumnDef) -> Result<(), AdapterError>;

    /// Drops a single column in place.
    ///
    /// The embedded dialect refuses this with
    /// [`AdapterErrorKind::Unsupported`]; destructive reshaping there goes
    /// through [`alter_table`](Self::alter_table) with an explicit target
    /// shape instead.
    async fn drop_column(&self, table: &str, column: &str) -> Result<(), AdapterError>;

    /// Brings `target.name` to the shape `target` by applying `changes`.
    ///
    /// Atomic from the caller's perspective: on failure the original table
    /// is left untouched. A table already in the target shape is left as is.
    async fn alter_table(
        &self,
        target: &TableShape,
        changes: &[ColumnChange],
    ) -> Result<(), AdapterError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dialect_parses_common_spellings() {
        assert_eq!("SQLite".parse::<Dialect>().unwrap(), Dialect::Sqlite);
        assert_eq!("postgresql".parse::<Dialect>().unwrap(), Dialect::Postgres);
        assert_eq!("pg".parse::<Dialect>().unwrap(), Dialect::Postgres);
        assert!("mysql".parse::<Dialect>().is_err());
    }

    #[test]
    fn unsupported_errors_are_classified() {
        let err = AdapterError::unsupported(Dialect::Sqlite, "drop column users.token");
        assert!(err.is_unsupported());
        assert!(!err.is_unique_violation());
        assert_eq!(err.to_string(), "sqlite adapter: drop column users.token");
    }
}
