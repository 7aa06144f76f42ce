//! Classification of PostgreSQL driver errors.

use strata_core::{AdapterError, AdapterErrorKind, Dialect};

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
    AdapterError::new(Dialect::Postgres, kind, message).with_source(err)
}
