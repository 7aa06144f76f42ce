//! Classification of SQLite driver errors.

use strata_core::{AdapterError, AdapterErrorKind, Dialect};

/// Primary result code SQLite uses for generic SQL errors (`SQLITE_ERROR`).
const SQLITE_ERROR: &str = "1";

/// Converts a driver error into a classified [`AdapterError`].
pub(crate) fn classify(err: sqlx::Error) -> AdapterError {
    let (kind, message) = match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            (AdapterErrorKind::UniqueViolation, db.message().to_string())
        }
        sqlx::Error::Database(db) => (AdapterErrorKind::Database, db.message().to_string()),
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
            (AdapterErrorKind::Decode, err.to_string())
        }
        other => (AdapterErrorKind::Database, other.to_string()),
    };
    AdapterError::new(Dialect::Sqlite, kind, message).with_source(err)
}

/// True when `ALTER TABLE ... ADD COLUMN` failed because the column exists.
///
/// SQLite reports this as a plain `SQLITE_ERROR`, so the code alone is not
/// enough. Anything that does not match both code and message is treated as
/// a genuine failure.
pub(crate) fn is_duplicate_column(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => {
            db.code().as_deref() == Some(SQLITE_ERROR)
                && db.message().starts_with("duplicate column name")
        }
        _ => false,
    }
}
